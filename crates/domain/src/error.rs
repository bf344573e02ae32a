//! Unified error types for the domain layer
//!
//! Every progression rule reports its failures as a `DomainError` value. None of
//! them are fatal; callers translate them into transport-level responses.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation before any rule ran
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced user/quest/item/power is absent
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The record is in a state that forbids the operation
    /// (quest already completed, power already at max level, ...)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Gold, ability points or stock too low
    #[error("Not enough {resource}: required {required}, available {available}")]
    InsufficientResource {
        resource: &'static str,
        required: i64,
        available: i64,
    },
}

impl DomainError {
    /// Creates a validation error for malformed input.
    ///
    /// # Example
    /// ```ignore
    /// if title.trim().is_empty() {
    ///     return Err(DomainError::validation("Quest title cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create an insufficient resource error
    pub fn insufficient(resource: &'static str, required: i64, available: i64) -> Self {
        Self::InsufficientResource {
            resource,
            required,
            available,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
