//! Artifact producer port
//!
//! The producer is the opaque generator behind the engine (an LLM, a code
//! generator, a human in a loop). The engine only asks it for an initial
//! artifact and for corrected ones.

use async_trait::async_trait;
use supervisor_domain::{Artifact, ArtifactContent, CorrectionRequest};
use thiserror::Error;

/// Errors that can occur while producing an artifact
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProducerError {
    #[error("Generation failed: {0}")]
    Failed(String),

    #[error("Generation timed out")]
    Timeout,

    /// The producer can no longer produce anything; retrying is pointless.
    #[error("Producer unavailable: {0}")]
    Unavailable(String),

    #[error("Producer returned an empty artifact")]
    Empty,
}

impl ProducerError {
    /// Whether the failure ends the session instead of consuming an attempt
    pub fn is_permanent(&self) -> bool {
        matches!(self, ProducerError::Unavailable(_))
    }
}

/// Source of candidate artifacts
#[async_trait]
pub trait ArtifactProducer: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// Produce the first artifact for a task
    async fn generate(&self, task: &str) -> Result<ArtifactContent, ProducerError>;

    /// Produce a corrected artifact after a rejection
    async fn regenerate(
        &self,
        task: &str,
        previous: &Artifact,
        correction: &CorrectionRequest,
    ) -> Result<ArtifactContent, ProducerError>;
}
