//! Use cases - User story orchestration.
//!
//! - `authoring` - editing content: entities, options, modifiers, replacements
//! - `choices` - a character choosing entities and options
//! - `audit` - whole-store validation

pub mod audit;
pub mod authoring;
pub mod choices;

pub use audit::{AuditError, AuditReport, ContentAudit};
pub use authoring::{AuthoringError, AuthoringUseCases, ContentAuthoring, ReplacementAuthoring};
pub use choices::{ChoiceUseCaseError, ChoiceUseCases};
