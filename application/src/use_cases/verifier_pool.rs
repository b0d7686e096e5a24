//! Verifier pool
//!
//! Fans one artifact out to every registered verifier concurrently and
//! collects one verdict per verifier, each under its own timeout.
//!
//! ```text
//!            ┌──▶ verifier A ──(timeout)──┐
//! artifact ──┼──▶ verifier B ──(timeout)──┼──▶ RoundResult (registration order)
//!            └──▶ verifier C ──(timeout)──┘
//! ```

use crate::ports::progress::VerificationProgressNotifier;
use crate::ports::verifier::{CheckReport, Verifier, VerifierError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use supervisor_domain::{Artifact, RoundResult, Verdict, VerifierId};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that prevent a round from being evaluated at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Artifact content is empty")]
    EmptyArtifact,

    #[error("Per-verifier timeout must be greater than zero")]
    InvalidTimeout,

    #[error("No verifiers registered")]
    NoVerifiers,

    #[error("Evaluation cancelled")]
    Cancelled,
}

/// Read-only set of verifiers, shareable across concurrent sessions
#[derive(Clone, Default)]
pub struct VerifierPool {
    verifiers: Vec<Arc<dyn Verifier>>,
}

impl VerifierPool {
    pub fn new(verifiers: Vec<Arc<dyn Verifier>>) -> Self {
        Self { verifiers }
    }

    /// Register another verifier; registration order is the verdict order.
    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifiers.push(verifier);
        self
    }

    pub fn len(&self) -> usize {
        self.verifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verifiers.is_empty()
    }

    pub fn ids(&self) -> Vec<VerifierId> {
        self.verifiers.iter().map(|v| v.id().clone()).collect()
    }

    /// Evaluate the artifact with every verifier concurrently.
    ///
    /// Every dispatched verifier yields exactly one verdict: its opinion, or
    /// a did-not-complete verdict on timeout, error or panic.
    pub async fn evaluate(
        &self,
        artifact: &Artifact,
        per_verifier_timeout: Duration,
        cancel: &CancellationToken,
        progress: &dyn VerificationProgressNotifier,
    ) -> Result<RoundResult, PoolError> {
        if artifact.content.is_empty() {
            return Err(PoolError::EmptyArtifact);
        }
        if per_verifier_timeout.is_zero() {
            return Err(PoolError::InvalidTimeout);
        }
        if self.verifiers.is_empty() {
            return Err(PoolError::NoVerifiers);
        }
        if cancel.is_cancelled() {
            return Err(PoolError::Cancelled);
        }

        debug!(
            "Dispatching artifact {} (attempt {}) to {} verifiers, timeout {:?}",
            artifact.id,
            artifact.attempt,
            self.verifiers.len(),
            per_verifier_timeout
        );

        let started = Instant::now();
        let shared = Arc::new(artifact.clone());
        let mut join_set = JoinSet::new();
        let mut task_index = HashMap::new();

        for (index, verifier) in self.verifiers.iter().enumerate() {
            let verifier = Arc::clone(verifier);
            let artifact = Arc::clone(&shared);

            let call_cancel = cancel.child_token();

            let handle = join_set.spawn(async move {
                let id = verifier.id().clone();
                let call_started = Instant::now();
                // Dropping the guard (timeout, abort) tells the call to stop
                let _guard = call_cancel.clone().drop_guard();
                let call = isolated_check(verifier, artifact, call_cancel);
                let verdict = match tokio::time::timeout(per_verifier_timeout, call).await {
                    Ok(Ok(Ok(report))) => report.into_verdict(id, call_started.elapsed()),
                    Ok(Ok(Err(e))) => {
                        Verdict::failed(id, e.to_string()).with_elapsed(call_started.elapsed())
                    }
                    Ok(Err(e)) => Verdict::failed(id, format!("verifier task failed: {}", e))
                        .with_elapsed(call_started.elapsed()),
                    Err(_) => Verdict::timed_out(id, per_verifier_timeout),
                };
                (index, verdict)
            });
            task_index.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<Verdict>> = vec![None; self.verifiers.len()];

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    join_set.abort_all();
                    info!("Evaluation cancelled, aborted in-flight verifiers");
                    return Err(PoolError::Cancelled);
                }
                result = join_set.join_next_with_id() => result,
            };

            let Some(result) = result else {
                break;
            };

            let (index, verdict) = match result {
                Ok((_, (index, verdict))) => (index, verdict),
                Err(e) => {
                    // Panicked (or aborted) task: recover its slot from the task id
                    let Some(&index) = task_index.get(&e.id()) else {
                        warn!("Join error from unknown verifier task: {}", e);
                        continue;
                    };
                    let id = self.verifiers[index].id().clone();
                    warn!("Verifier {} task failed: {}", id, e);
                    (index, Verdict::failed(id, format!("verifier task failed: {}", e)))
                }
            };

            if verdict.is_completed() {
                info!(
                    "Verifier {} {} ({} issues, {}ms)",
                    verdict.verifier,
                    if verdict.approved { "approved" } else { "rejected" },
                    verdict.issues.len(),
                    verdict.elapsed_ms
                );
            } else {
                warn!(
                    "Verifier {} did not complete: {:?}",
                    verdict.verifier,
                    verdict.non_completion()
                );
            }
            progress.on_verifier_complete(&verdict);
            slots[index] = Some(verdict);
        }

        let verdicts = slots.into_iter().flatten().collect();
        Ok(RoundResult::new(verdicts, started.elapsed()))
    }
}

/// Run one check on a blocking thread so a verifier that never yields
/// cannot hold off its own timeout.
fn isolated_check(
    verifier: Arc<dyn Verifier>,
    artifact: Arc<Artifact>,
    cancel: CancellationToken,
) -> JoinHandle<Result<CheckReport, VerifierError>> {
    let handle = Handle::current();
    tokio::task::spawn_blocking(move || {
        handle.block_on(async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    Err(VerifierError::ExecutionFailed("check abandoned".to_string()))
                }
                result = verifier.check(&artifact) => result,
            }
        })
    })
}
