//! Verifier port
//!
//! Defines the contract every independent checker implements. The pool
//! time-boxes each call on a blocking thread of its own, so implementations
//! do not need their own deadline and may do synchronous work.

use async_trait::async_trait;
use std::time::Duration;
use supervisor_domain::{Artifact, Issue, Verdict, VerifierId};
use thiserror::Error;

/// Errors a verifier can report instead of an opinion
#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("Verifier unavailable: {0}")]
    Unavailable(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The opinion a verifier returns; identity and timing are stamped by the pool.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub approved: bool,
    pub issues: Vec<Issue>,
    pub confidence: f64,
}

impl CheckReport {
    pub fn approve() -> Self {
        Self {
            approved: true,
            issues: Vec::new(),
            confidence: 1.0,
        }
    }

    pub fn reject(issues: Vec<Issue>) -> Self {
        Self {
            approved: false,
            issues,
            confidence: 1.0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Turn the report into a completed verdict.
    pub fn into_verdict(self, verifier: VerifierId, elapsed: Duration) -> Verdict {
        Verdict::new(verifier, self.approved, self.issues)
            .with_confidence(self.confidence)
            .with_elapsed(elapsed)
    }
}

/// An independent evaluator of artifacts
///
/// The task description travels with the artifact (`artifact.task`).
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Stable identity used in verdicts, logs and issue attribution
    fn id(&self) -> &VerifierId;

    /// Evaluate the artifact against its task
    async fn check(&self, artifact: &Artifact) -> Result<CheckReport, VerifierError>;
}
