//! JSON content bundle importer.
//!
//! A bundle is one file holding every kind of content:
//!
//! ```json
//! { "feats": [...], "raceTraits": [...], "classFeatures": [...], "items": ["<uuid>", ...] }
//! ```
//!
//! Entities are decoded one at a time. An entity that does not decode is
//! skipped; a modifier that does not decode is dropped from its entity. Both
//! are logged and counted, and everything else is imported. Pool-wide rules
//! are not checked here; run the content audit afterwards.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use charforge_domain::modifiers::decode_batch;
use charforge_domain::{ItemId, OwnerKind, OwningEntity};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;

use crate::infrastructure::ports::{OwnerRepo, RepoError};
use crate::repositories::ContentRepos;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Bundle file not found: {0}")]
    BundleNotFound(PathBuf),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBundle {
    #[serde(default)]
    feats: Vec<Value>,
    #[serde(default)]
    race_traits: Vec<Value>,
    #[serde(default)]
    class_features: Vec<Value>,
    #[serde(default)]
    items: Vec<ItemId>,
}

/// Something in the bundle that was not imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// "feat", "race trait modifier", ...
    pub kind: String,
    /// Position within its list
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub feats: usize,
    pub race_traits: usize,
    pub class_features: usize,
    pub modifiers: usize,
    /// Item ids declared by the bundle, for resolving weapon references
    pub items: HashSet<ItemId>,
    pub rejected: Vec<RejectedEntry>,
}

impl ImportSummary {
    pub fn imported(&self) -> usize {
        self.feats + self.race_traits + self.class_features
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

pub struct BundleImporter {
    content: ContentRepos,
}

impl BundleImporter {
    pub fn new(content: ContentRepos) -> Self {
        Self { content }
    }

    /// Import a bundle file into the content stores.
    pub async fn import_file(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        if !fs::try_exists(path).await? {
            return Err(ImportError::BundleNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).await?;
        tracing::info!(path = %path.display(), bytes = text.len(), "Importing content bundle");
        self.import_str(&text).await
    }

    pub async fn import_str(&self, text: &str) -> Result<ImportSummary, ImportError> {
        let bundle: RawBundle = serde_json::from_str(text)?;
        let mut summary = ImportSummary {
            items: bundle.items.into_iter().collect(),
            ..ImportSummary::default()
        };

        summary.feats = import_kind(&*self.content.feats, bundle.feats, &mut summary).await?;
        summary.race_traits =
            import_kind(&*self.content.race_traits, bundle.race_traits, &mut summary).await?;
        summary.class_features =
            import_kind(&*self.content.class_features, bundle.class_features, &mut summary)
                .await?;

        tracing::info!(
            feats = summary.feats,
            race_traits = summary.race_traits,
            class_features = summary.class_features,
            modifiers = summary.modifiers,
            items = summary.items.len(),
            rejected = summary.rejected.len(),
            "Content bundle imported"
        );
        Ok(summary)
    }
}

fn raw_id(raw: &Value) -> Option<String> {
    raw.get("id").and_then(Value::as_str).map(str::to_string)
}

/// Decode and save every entity of one kind. Returns how many were saved.
async fn import_kind<K: OwnerKind>(
    repo: &dyn OwnerRepo<K>,
    raw_entities: Vec<Value>,
    summary: &mut ImportSummary,
) -> Result<usize, ImportError> {
    let mut saved = 0;
    for (index, raw) in raw_entities.into_iter().enumerate() {
        let id = raw_id(&raw);
        match decode_entity::<K>(raw, summary) {
            Ok(entity) => {
                repo.save(&entity).await?;
                summary.modifiers += entity.modifiers().len();
                saved += 1;
            }
            Err(reason) => {
                tracing::warn!(
                    kind = K::ENTITY_LABEL,
                    index,
                    id = ?id,
                    error = %reason,
                    "Skipping entity that does not decode"
                );
                summary.rejected.push(RejectedEntry {
                    kind: K::ENTITY_LABEL.to_string(),
                    index,
                    id,
                    reason,
                });
            }
        }
    }
    Ok(saved)
}

/// Decode the entity without its modifiers, then decode the modifiers as a
/// batch so one bad record costs only itself.
fn decode_entity<K: OwnerKind>(
    mut raw: Value,
    summary: &mut ImportSummary,
) -> Result<OwningEntity<K>, String> {
    let modifiers = raw
        .as_object_mut()
        .and_then(|fields| fields.remove("modifiers"))
        .unwrap_or(Value::Null);
    let modifiers = match modifiers {
        Value::Array(records) => records,
        Value::Null => Vec::new(),
        other => return Err(format!("modifiers must be a list, got {other}")),
    };

    let mut entity: OwningEntity<K> = serde_json::from_value(raw).map_err(|e| e.to_string())?;
    let modifier_kind = format!("{} modifier", K::ENTITY_LABEL);

    let batch = decode_batch(modifiers);
    for rejected in batch.rejected {
        tracing::warn!(
            entity_id = %entity.id(),
            index = rejected.index,
            error = %rejected.error,
            "Dropping modifier that does not decode"
        );
        summary.rejected.push(RejectedEntry {
            kind: modifier_kind.clone(),
            index: rejected.index,
            id: rejected.id,
            reason: rejected.error.to_string(),
        });
    }
    for (index, modifier) in batch.modifiers.into_iter().enumerate() {
        let modifier_id = modifier.id().to_string();
        if let Err(e) = entity.attach_modifier(modifier) {
            tracing::warn!(entity_id = %entity.id(), error = %e, "Dropping modifier");
            summary.rejected.push(RejectedEntry {
                kind: modifier_kind.clone(),
                index,
                id: Some(modifier_id),
                reason: e.to_string(),
            });
        }
    }
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use charforge_domain::modifiers::{codec, DamageTypeModifier};
    use charforge_domain::types::DamageType;
    use charforge_domain::{
        ContentName, FeatId, FeatOwner, Modifier, ModifierId, ModifierOwner, ModifierVariant,
        OptionDraft, RaceTraitOwner,
    };
    use serde_json::json;
    use std::io::Write;

    fn sample_bundle() -> (Value, FeatId) {
        let mut trait_ = OwningEntity::<RaceTraitOwner>::new(ContentName::new("Hellish Resistance").unwrap());
        trait_
            .options_mut()
            .add_option(OptionDraft::new(ContentName::new("Fire Ward").unwrap()))
            .unwrap();
        let good = Modifier::new(
            ModifierOwner::RaceTrait(trait_.id()),
            ModifierVariant::Resistance(DamageTypeModifier::of([DamageType::Fire])),
        );
        trait_.attach_modifier(good).unwrap();
        let mut trait_json = serde_json::to_value(&trait_).unwrap();
        trait_json["modifiers"]
            .as_array_mut()
            .unwrap()
            .push(json!({
                "id": ModifierId::new(),
                "raceTraitId": trait_.id(),
                "type": "Telepathy",
                "appliesOnMulticlass": false
            }));

        let feat_id = FeatId::new();
        let bundle = json!({
            "feats": [
                { "id": feat_id, "name": "Alert" },
                { "id": FeatId::new(), "name": "" }
            ],
            "raceTraits": [trait_json],
            "items": [ItemId::new()]
        });
        (bundle, feat_id)
    }

    #[tokio::test]
    async fn bad_entries_are_skipped_and_counted() {
        let content = ContentRepos::in_memory();
        let (bundle, feat_id) = sample_bundle();

        let summary = BundleImporter::new(content.clone())
            .import_str(&bundle.to_string())
            .await
            .unwrap();

        assert_eq!(summary.feats, 1);
        assert_eq!(summary.race_traits, 1);
        assert_eq!(summary.class_features, 0);
        assert_eq!(summary.modifiers, 1);
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.rejected.len(), 2);
        assert!(summary.rejected.iter().any(|r| r.kind == "feat" && r.index == 1));
        assert!(summary
            .rejected
            .iter()
            .any(|r| r.kind == "race trait modifier" && r.reason.contains("Telepathy")));

        assert!(content.feats.get(feat_id).await.unwrap().is_some());
        let traits = content.race_traits.list().await.unwrap();
        assert_eq!(traits[0].options().len(), 1);
        assert_eq!(traits[0].modifiers().len(), 1);
    }

    #[tokio::test]
    async fn imports_from_file() {
        let content = ContentRepos::in_memory();
        let (bundle, _) = sample_bundle();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", bundle).unwrap();

        let summary = BundleImporter::new(content)
            .import_file(file.path())
            .await
            .unwrap();
        assert_eq!(summary.imported(), 2);
        assert!(!summary.is_clean());
    }

    #[tokio::test]
    async fn missing_file_and_bad_json() {
        let importer = BundleImporter::new(ContentRepos::in_memory());
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            importer.import_file(&dir.path().join("absent.json")).await,
            Err(ImportError::BundleNotFound(_))
        ));
        assert!(matches!(
            importer.import_str("{ not json").await,
            Err(ImportError::Json(_))
        ));
    }

    #[tokio::test]
    async fn modifier_owned_by_another_entity_is_dropped() {
        let content = ContentRepos::in_memory();
        let feat = OwningEntity::<FeatOwner>::new(ContentName::new("Tough").unwrap());
        let stray = Modifier::new(
            ModifierOwner::Feat(FeatId::new()),
            ModifierVariant::Resistance(DamageTypeModifier::of([DamageType::Poison])),
        );
        let mut feat_json = serde_json::to_value(&feat).unwrap();
        feat_json["modifiers"] = json!([codec::encode_json(&stray).unwrap()]);

        let summary = BundleImporter::new(content.clone())
            .import_str(&json!({ "feats": [feat_json] }).to_string())
            .await
            .unwrap();
        assert_eq!(summary.feats, 1);
        assert_eq!(summary.modifiers, 0);
        assert_eq!(summary.rejected.len(), 1);
        assert!(content
            .feats
            .get(feat.id())
            .await
            .unwrap()
            .unwrap()
            .modifiers()
            .is_empty());
    }
}
