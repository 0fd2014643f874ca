//! Character level and the level gates that content places on options.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Highest character level.
pub const MAX_CHARACTER_LEVEL: u8 = 20;

/// A character's total level (1-20).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CharacterLevel(u8);

impl CharacterLevel {
    pub fn new(level: u8) -> Result<Self, DomainError> {
        if level == 0 || level > MAX_CHARACTER_LEVEL {
            return Err(DomainError::validation(format!(
                "Character level must be between 1 and {}, got {}",
                MAX_CHARACTER_LEVEL, level
            )));
        }
        Ok(Self(level))
    }

    pub fn first() -> Self {
        Self(1)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Whether this level satisfies a gate.
    pub fn meets(&self, gate: LevelGate) -> bool {
        self.0 >= gate.value()
    }
}

impl TryFrom<u8> for CharacterLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CharacterLevel> for u8 {
    fn from(level: CharacterLevel) -> Self {
        level.0
    }
}

impl fmt::Display for CharacterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum character level an option requires (0-20, where 0 means ungated).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct LevelGate(u8);

impl LevelGate {
    pub fn new(level: u8) -> Result<Self, DomainError> {
        if level > MAX_CHARACTER_LEVEL {
            return Err(DomainError::validation(format!(
                "Required character level cannot exceed {}, got {}",
                MAX_CHARACTER_LEVEL, level
            )));
        }
        Ok(Self(level))
    }

    pub fn none() -> Self {
        Self(0)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_gated(&self) -> bool {
        self.0 > 1
    }
}

impl TryFrom<u8> for LevelGate {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LevelGate> for u8 {
    fn from(gate: LevelGate) -> Self {
        gate.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_level_bounds() {
        assert!(CharacterLevel::new(0).is_err());
        assert!(CharacterLevel::new(21).is_err());
        assert_eq!(CharacterLevel::new(20).unwrap().value(), 20);
    }

    #[test]
    fn level_meets_gate() {
        let two = CharacterLevel::new(2).unwrap();
        let three = CharacterLevel::new(3).unwrap();
        let gate = LevelGate::new(3).unwrap();
        assert!(!two.meets(gate));
        assert!(three.meets(gate));
        assert!(two.meets(LevelGate::none()));
    }

    #[test]
    fn gate_bounds() {
        assert!(LevelGate::new(21).is_err());
        assert!(!LevelGate::new(1).unwrap().is_gated());
        assert!(LevelGate::new(5).unwrap().is_gated());
    }

    #[test]
    fn serde_validates_level() {
        assert!(serde_json::from_str::<CharacterLevel>("0").is_err());
        assert_eq!(
            serde_json::from_str::<CharacterLevel>("7").unwrap().value(),
            7
        );
    }
}
