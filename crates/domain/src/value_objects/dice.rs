//! Dice value objects and parsing
//!
//! Supports notation like "1d8" and "2d6" for modifier dice and natural weapons.
//! Flat additions live on the modifier's fixed value, not on the dice.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error when building or parsing dice
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    /// The notation string is empty
    #[error("Empty dice notation")]
    Empty,
    /// Invalid format - expected XdY
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    ZeroCount,
    /// Die size is not a standard polyhedral
    #[error("Unsupported die size: d{0}")]
    UnsupportedDie(u8),
}

/// A standard polyhedral die.
///
/// Serialized as its number of sides so stored records read `"diceValue": 6`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DieSize {
    #[default]
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieSize {
    /// Number of faces on the die.
    pub fn sides(&self) -> u8 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
        }
    }

    /// Look up a die by its number of faces.
    pub fn from_sides(sides: u8) -> Result<Self, DiceError> {
        match sides {
            4 => Ok(Self::D4),
            6 => Ok(Self::D6),
            8 => Ok(Self::D8),
            10 => Ok(Self::D10),
            12 => Ok(Self::D12),
            20 => Ok(Self::D20),
            100 => Ok(Self::D100),
            other => Err(DiceError::UnsupportedDie(other)),
        }
    }
}

impl TryFrom<u8> for DieSize {
    type Error = DiceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_sides(value)
    }
}

impl From<DieSize> for u8 {
    fn from(value: DieSize) -> Self {
        value.sides()
    }
}

impl fmt::Display for DieSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A pool of identical dice like "2d6".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDiceRoll")]
pub struct DiceRoll {
    count: u8,
    die: DieSize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawDiceRoll {
    count: u8,
    die: DieSize,
}

impl TryFrom<RawDiceRoll> for DiceRoll {
    type Error = DiceError;

    fn try_from(raw: RawDiceRoll) -> Result<Self, Self::Error> {
        Self::new(raw.count, raw.die)
    }
}

impl DiceRoll {
    /// Create a dice pool. The count must be at least 1.
    pub fn new(count: u8, die: DieSize) -> Result<Self, DiceError> {
        if count == 0 {
            return Err(DiceError::ZeroCount);
        }
        Ok(Self { count, die })
    }

    /// Number of dice rolled.
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Size of each die.
    pub fn die(&self) -> DieSize {
        self.die
    }

    /// Highest possible total.
    pub fn max_total(&self) -> u32 {
        u32::from(self.count) * u32::from(self.die.sides())
    }

    /// Parse notation like "2d6" or "d8" (shorthand for "1d8").
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(DiceError::Empty);
        }

        let d_pos = input.find('d').ok_or_else(|| {
            DiceError::InvalidFormat(format!("Missing 'd' separator in '{}'", input))
        })?;

        let count_str = &input[..d_pos];
        let count: u8 = if count_str.is_empty() {
            1 // "d20" means "1d20"
        } else {
            count_str.parse().map_err(|_| {
                DiceError::InvalidFormat(format!("Invalid dice count: '{}'", count_str))
            })?
        };

        let sides_str = &input[d_pos + 1..];
        let sides: u8 = sides_str.parse().map_err(|_| {
            DiceError::InvalidFormat(format!("Invalid die size: '{}'", sides_str))
        })?;

        Self::new(count, DieSize::from_sides(sides)?)
    }
}

impl Default for DiceRoll {
    fn default() -> Self {
        Self {
            count: 1,
            die: DieSize::D4,
        }
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.die)
    }
}
