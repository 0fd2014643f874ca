//! Engine configuration read from the environment.

use std::path::PathBuf;

use charforge_domain::value_objects::MAX_DETAILS_LENGTH;

pub const CONTENT_BUNDLE_VAR: &str = "CHARFORGE_CONTENT_BUNDLE";
pub const STRICT_AUDIT_VAR: &str = "CHARFORGE_STRICT_AUDIT";
pub const MAX_DETAILS_LEN_VAR: &str = "CHARFORGE_MAX_DETAILS_LEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// JSON content bundle imported at startup
    pub content_bundle: Option<PathBuf>,
    /// Exit non-zero when the startup audit finds problems
    pub strict_audit: bool,
    /// Cap on modifier `details` at authoring time, never above the domain maximum
    pub max_details_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content_bundle: None,
            strict_audit: false,
            max_details_len: MAX_DETAILS_LENGTH,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let content_bundle = lookup(CONTENT_BUNDLE_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let strict_audit = match lookup(STRICT_AUDIT_VAR) {
            None => defaults.strict_audit,
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    var = STRICT_AUDIT_VAR,
                    value = %raw,
                    "Unrecognized boolean, using default"
                );
                defaults.strict_audit
            }),
        };

        let max_details_len = match lookup(MAX_DETAILS_LEN_VAR) {
            None => defaults.max_details_len,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) | Err(_) => {
                    tracing::warn!(
                        var = MAX_DETAILS_LEN_VAR,
                        value = %raw,
                        "Invalid details length, using default"
                    );
                    defaults.max_details_len
                }
                Ok(len) if len > MAX_DETAILS_LENGTH => {
                    tracing::warn!(
                        var = MAX_DETAILS_LEN_VAR,
                        requested = len,
                        max = MAX_DETAILS_LENGTH,
                        "Details length above domain maximum, clamping"
                    );
                    MAX_DETAILS_LENGTH
                }
                Ok(len) => len,
            },
        };

        Self {
            content_bundle,
            strict_audit,
            max_details_len,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]), EngineConfig::default());
        assert_eq!(config(&[]).max_details_len, 500);
    }

    #[test]
    fn reads_all_variables() {
        let cfg = config(&[
            (CONTENT_BUNDLE_VAR, "content/srd.json"),
            (STRICT_AUDIT_VAR, "true"),
            (MAX_DETAILS_LEN_VAR, "120"),
        ]);
        assert_eq!(cfg.content_bundle, Some(PathBuf::from("content/srd.json")));
        assert!(cfg.strict_audit);
        assert_eq!(cfg.max_details_len, 120);
    }

    #[test]
    fn details_cap_never_rises_above_domain_maximum() {
        assert_eq!(config(&[(MAX_DETAILS_LEN_VAR, "5000")]).max_details_len, 500);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = config(&[
            (CONTENT_BUNDLE_VAR, "   "),
            (STRICT_AUDIT_VAR, "maybe"),
            (MAX_DETAILS_LEN_VAR, "lots"),
        ]);
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(config(&[(MAX_DETAILS_LEN_VAR, "0")]).max_details_len, 500);
    }
}
