//! Regeneration controller
//!
//! Turns rejected decisions into correction requests, waits out the backoff
//! schedule and asks the producer for a new artifact. Both the wait and the
//! producer call stop as soon as the session is cancelled.

use crate::ports::artifact_producer::{ArtifactProducer, ProducerError};
use std::sync::Arc;
use std::time::Duration;
use supervisor_domain::{
    Artifact, BackoffSchedule, CorrectionRequest, Decision, VerificationSession,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors returned while obtaining an artifact
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegenerationError {
    #[error(transparent)]
    Producer(#[from] ProducerError),

    #[error("Regeneration cancelled")]
    Cancelled,
}

/// Drives the producer on behalf of a session
pub struct RegenerationController {
    producer: Arc<dyn ArtifactProducer>,
    backoff: BackoffSchedule,
}

impl RegenerationController {
    pub fn new(producer: Arc<dyn ArtifactProducer>, backoff: BackoffSchedule) -> Self {
        Self { producer, backoff }
    }

    pub fn producer_name(&self) -> &str {
        self.producer.name()
    }

    /// Package a rejected decision for the producer.
    pub fn request_correction(artifact: &Artifact, decision: &Decision) -> CorrectionRequest {
        CorrectionRequest::from_decision(artifact, decision)
    }

    /// Whether the session may produce another artifact.
    pub fn should_retry(session: &VerificationSession) -> bool {
        session.should_retry()
    }

    /// Backoff before the given 1-based regeneration
    pub fn delay_for(&self, regeneration: u32) -> Duration {
        self.backoff.delay_for(regeneration)
    }

    /// Ask the producer for the first artifact of a task.
    ///
    /// `try_number` is 1-based; retries after a failed first try wait out the
    /// same backoff schedule as regenerations.
    pub async fn generate(
        &self,
        task: &str,
        try_number: u32,
        cancel: &CancellationToken,
    ) -> Result<Artifact, RegenerationError> {
        self.back_off(try_number, cancel).await?;
        info!(
            "Generating initial artifact with {} (try {})",
            self.producer.name(),
            try_number
        );

        let content = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RegenerationError::Cancelled),
            result = self.producer.generate(task) => result?,
        };

        if content.is_empty() {
            warn!("Producer {} returned an empty artifact", self.producer.name());
            return Err(ProducerError::Empty.into());
        }

        Ok(Artifact::new(task, content))
    }

    /// Wait out the backoff, then ask the producer for a corrected artifact.
    ///
    /// The returned artifact has a fresh id; the session renumbers its attempt.
    pub async fn regenerate(
        &self,
        previous: &Artifact,
        request: &CorrectionRequest,
        regeneration: u32,
        cancel: &CancellationToken,
    ) -> Result<Artifact, RegenerationError> {
        self.back_off(regeneration, cancel).await?;

        info!(
            "Requesting regeneration {} of artifact {} ({} issues)",
            regeneration,
            previous.id,
            request.issues.len()
        );

        let content = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RegenerationError::Cancelled),
            result = self.producer.regenerate(&previous.task, previous, request) => result?,
        };

        if content.is_empty() {
            warn!("Producer {} returned an empty artifact", self.producer.name());
            return Err(ProducerError::Empty.into());
        }

        Ok(previous.regenerated(content))
    }

    async fn back_off(&self, n: u32, cancel: &CancellationToken) -> Result<(), RegenerationError> {
        let delay = self.delay_for(n);
        if delay.is_zero() {
            return Ok(());
        }
        debug!("Backing off {:?} before try {}", delay, n);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RegenerationError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
