//! Value objects - immutable, validated-by-construction domain values

mod dice;
mod duration;
mod level;
mod names;

pub use dice::{DiceError, DiceRoll, DieSize};
pub use duration::{DurationUnit, ModifierDuration};
pub use level::{CharacterLevel, LevelGate, MAX_CHARACTER_LEVEL};
pub use names::{
    ContentName, Description, Details, MAX_DESCRIPTION_LENGTH, MAX_DETAILS_LENGTH,
    MAX_NAME_LENGTH,
};
