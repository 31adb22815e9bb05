//! Unified error types for the domain layer
//!
//! Value objects parse from free text (catalog JSON, prerequisite strings,
//! snapshot fields); every such failure is a [`DomainError`].

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant or format:
    ///
    /// ```ignore
    /// impl FromStr for Ability {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         match s {
    ///             "str" => Ok(Self::Strength),
    ///             _ => Err(DomainError::parse(format!("Unknown ability: {}", s))),
    ///         }
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
