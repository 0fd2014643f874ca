use thiserror::Error;

use crate::graph::GraphError;

/// Why a character cannot make a choice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error("{option} requires {} to be chosen first", .missing.join(", "))]
    PrerequisiteUnmet { option: String, missing: Vec<String> },

    #[error("{option} requires character level {required}, character is level {actual}")]
    LevelTooLow {
        option: String,
        required: u8,
        actual: u8,
    },

    #[error("{id} has already been chosen")]
    AlreadyChosen { id: String },

    #[error("{entity} has been superseded by {by}")]
    Superseded { entity: String, by: String },

    #[error("{option} is not an option of {entity}")]
    UnknownOption { entity: String, option: String },

    #[error("{entity} must be chosen before its options")]
    OwnerNotSelected { entity: String },

    #[error("Character level cannot go from {current} to {requested}")]
    LevelNotRaised { current: u8, requested: u8 },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
