//! Unified error types for the domain layer
//!
//! Provides a common error type used across all container operations,
//! keeping expected business rejections (invariant violations, refused
//! state transitions) distinguishable from malformed input without
//! resorting to string matching.

use thiserror::Error;
use validator::ValidationErrors;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone)]
pub enum DomainError {
    /// Schema validation failed at creation time. The field-level errors
    /// from the validation layer are carried verbatim.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Raw input could not be deserialized into the container's state shape
    #[error("Malformed input: {0}")]
    Malformed(String),

    /// A declared invariant did not hold against a proposed state
    #[error("Invariant '{name}' violated: {message}")]
    InvariantViolation {
        name: &'static str,
        message: String,
    },

    /// State transition not allowed (business rejection inside an action)
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// An action attempted to rewrite the container's identity
    #[error("Identity is immutable: {0}")]
    IdentityChanged(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
}

impl DomainError {
    /// Creates an invariant-violation error.
    ///
    /// Normally produced by [`Invariant::enforce`](crate::Invariant::enforce);
    /// actions that check a rule themselves can also use it directly.
    pub fn invariant(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            name,
            message: message.into(),
        }
    }

    /// Creates an invalid state transition error.
    ///
    /// Use this inside an action when the current state does not admit the
    /// requested operation:
    ///
    /// ```ignore
    /// if state.status != OrderStatus::Pending {
    ///     return Err(DomainError::invalid_state_transition(
    ///         "Only pending orders can be paid",
    ///     ));
    /// }
    /// ```
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Create an identity-changed error
    pub fn identity_changed(msg: impl Into<String>) -> Self {
        Self::IdentityChanged(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Create a malformed-input error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
