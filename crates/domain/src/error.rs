//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing adapters to use String or anyhow.
//! The codec, graph, and choice modules keep their own precise error enums and
//! convert into `DomainError` at the boundary.

use thiserror::Error;

use crate::choice::ChoiceError;
use crate::graph::GraphError;
use crate::modifiers::DecodeError;
use crate::value_objects::DiceError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects and stored records)
    #[error("Parse error: {0}")]
    Parse(String),

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when domain invariants or constraints are violated:
    /// - Required fields are empty or missing
    /// - Values are outside allowed ranges
    ///
    /// # Example
    /// ```ignore
    /// if name.is_empty() {
    ///     return Err(DomainError::validation("Option name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<DiceError> for DomainError {
    fn from(err: DiceError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<DecodeError> for DomainError {
    fn from(err: DecodeError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<GraphError> for DomainError {
    fn from(err: GraphError) -> Self {
        Self::Constraint(err.to_string())
    }
}

impl From<ChoiceError> for DomainError {
    fn from(err: ChoiceError) -> Self {
        Self::InvalidStateTransition(err.to_string())
    }
}
