//! Validated text newtypes for authored content
//!
//! These newtypes ensure that text is valid by construction:
//! - Names are non-empty and trimmed
//! - Every field stays within its length limit

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for names of options, feats, traits, and features
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length for option and entity descriptions
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Maximum length for a modifier's free-text details
pub const MAX_DETAILS_LENGTH: usize = 500;

// ============================================================================
// ContentName
// ============================================================================

/// A validated name for authored content (non-empty, <=200 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentName(String);

impl ContentName {
    /// Create a new validated name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is empty after trimming or
    /// exceeds 200 characters.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Name cannot exceed {} characters",
                MAX_NAME_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ContentName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentName> for String {
    fn from(name: ContentName) -> String {
        name.0
    }
}

// ============================================================================
// Description
// ============================================================================

/// A validated description (may be empty, <=5000 chars)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    /// Create a new validated description.
    ///
    /// Empty strings are valid for descriptions.
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(DomainError::validation(format!(
                "Description cannot exceed {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
        Ok(Self(text))
    }

    /// Create an empty description.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Returns the description as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the description is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Description {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Description> for String {
    fn from(desc: Description) -> String {
        desc.0
    }
}

// ============================================================================
// Details
// ============================================================================

/// Free-text details attached to a modifier (<=500 chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Details(String);

impl Details {
    /// Create validated details against the domain maximum.
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        Self::with_limit(text, MAX_DETAILS_LENGTH)
    }

    /// Create validated details against a stricter limit.
    ///
    /// The limit is clamped to the domain maximum; it can only tighten the rule.
    pub fn with_limit(text: impl Into<String>, limit: usize) -> Result<Self, DomainError> {
        let text = text.into();
        let limit = limit.min(MAX_DETAILS_LENGTH);
        if text.chars().count() > limit {
            return Err(DomainError::validation(format!(
                "Modifier details cannot exceed {} characters",
                limit
            )));
        }
        Ok(Self(text))
    }

    /// Returns the details as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Details {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Details {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Details> for String {
    fn from(details: Details) -> String {
        details.0
    }
}
