//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the attack tree model.
///
/// Construction errors (`MalformedTree`, `DuplicateId`) are fatal to the
/// build attempt. Lookup and mutation errors leave the tree untouched and
/// can be retried with a corrected id or value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("malformed tree at {location}: {reason}")]
    MalformedTree { location: String, reason: String },

    #[error("duplicate node id '{id}' at {second} (first declared at {first})")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("invalid value for node '{id}': {value} (must be a finite number >= 0)")]
    InvalidValue { id: String, value: f64 },

    #[error("node '{0}' is a gate, only leaves carry a value")]
    NotALeaf(String),
}

impl DomainError {
    pub(crate) fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
