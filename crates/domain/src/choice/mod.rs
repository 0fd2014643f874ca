//! Character choices: which entities and options a character has taken.

mod error;
mod ledger;
mod resolver;
mod selections;

pub use error::ChoiceError;
pub use ledger::{ChoiceEvent, ChoiceLedger, EntityState};
pub use resolver::{
    option_state, resolve_option_states, validate_choice_set, ChoiceSnapshot, OptionState,
};
pub use selections::{CharacterSelections, SelectionKind};
