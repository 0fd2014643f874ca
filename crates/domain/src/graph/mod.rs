//! Option prerequisite graphs and replacement links.

mod entity;
mod error;
mod option;
mod owner;
mod replacement;
mod validator;
mod walk;

pub use entity::OwningEntity;
pub use error::GraphError;
pub use option::{OptionDraft, OptionNode, OwnedOptionGraph};
pub use owner::{ClassFeatureOwner, FeatOwner, GraphId, OwnerKind, RaceTraitOwner, Replaceable};
pub use replacement::{ReplacementGraph, ReplacementLink};
pub use validator::{GraphValidator, ReferenceIssue, ValidationReport};
