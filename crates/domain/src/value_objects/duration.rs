//! How long a modifier lasts once triggered.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Unit for a modifier duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationUnit {
    Round,
    Minute,
    Hour,
    Day,
    /// Until the end of the next short rest
    ShortRest,
    /// Until the end of the next long rest
    LongRest,
}

impl DurationUnit {
    fn label(&self, plural: bool) -> &'static str {
        match (self, plural) {
            (Self::Round, false) => "round",
            (Self::Round, true) => "rounds",
            (Self::Minute, false) => "minute",
            (Self::Minute, true) => "minutes",
            (Self::Hour, false) => "hour",
            (Self::Hour, true) => "hours",
            (Self::Day, false) => "day",
            (Self::Day, true) => "days",
            (Self::ShortRest, false) => "short rest",
            (Self::ShortRest, true) => "short rests",
            (Self::LongRest, false) => "long rest",
            (Self::LongRest, true) => "long rests",
        }
    }
}

/// A count of duration units, e.g. "10 minutes".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDuration")]
pub struct ModifierDuration {
    count: u32,
    unit: DurationUnit,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDuration {
    count: u32,
    unit: DurationUnit,
}

impl TryFrom<RawDuration> for ModifierDuration {
    type Error = DomainError;

    fn try_from(raw: RawDuration) -> Result<Self, Self::Error> {
        Self::new(raw.count, raw.unit)
    }
}

impl ModifierDuration {
    /// Create a duration. Zero-length durations are rejected.
    pub fn new(count: u32, unit: DurationUnit) -> Result<Self, DomainError> {
        if count == 0 {
            return Err(DomainError::validation("Duration count must be at least 1"));
        }
        Ok(Self { count, unit })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn unit(&self) -> DurationUnit {
        self.unit
    }
}

impl fmt::Display for ModifierDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.count, self.unit.label(self.count != 1))
    }
}
