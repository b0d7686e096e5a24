//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Artifact content is empty")]
    EmptyArtifact,

    #[error("Task description is empty")]
    EmptyTask,

    #[error("Invalid quorum rule: {0}")]
    InvalidQuorumRule(String),

    #[error("Invalid session transition from {from} on {event}")]
    InvalidTransition { from: String, event: &'static str },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
