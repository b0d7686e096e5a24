//! Run Verification use case
//!
//! Drives one [`VerificationSession`] through the pool, the aggregator and
//! the regeneration controller until it reaches a terminal outcome.
//!
//! ```text
//! request ──▶ (generate) ──▶ Evaluating ──pool──▶ aggregate ──▶ Decision
//!                               ▲                                 │
//!                               │ new artifact        Reevaluate ─┤ (same artifact,
//!                               │                                 │  longer timeout)
//!                               └──── Regenerating ◀── Regenerate ┤
//!                                                                 │
//!                                     Accepted / ExhaustedRetries / FatalError
//! ```

use crate::config::VerificationParams;
use crate::ports::artifact_producer::ArtifactProducer;
use crate::ports::progress::{NoProgress, VerificationProgressNotifier};
use crate::ports::verification_logger::{
    NoVerificationLogger, VerificationEvent, VerificationLogger,
};
use crate::use_cases::regeneration::{RegenerationController, RegenerationError};
use crate::use_cases::verifier_pool::{PoolError, VerifierPool};
use serde_json::json;
use std::sync::Arc;
use supervisor_domain::{
    Artifact, CorrectionRequest, DomainError, FatalCause, ProducerFailure, SessionAction,
    SessionId, SessionOutcome, SessionReport, VerificationSession, aggregate,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// What to verify
#[derive(Debug, Clone)]
pub enum VerificationRequest {
    /// Review an artifact that already exists
    Artifact(Artifact),
    /// Ask the producer for the first artifact, then review it
    Task(String),
}

impl VerificationRequest {
    pub fn task(&self) -> &str {
        match self {
            VerificationRequest::Artifact(artifact) => &artifact.task,
            VerificationRequest::Task(task) => task,
        }
    }
}

/// Where the driver stopped early
enum Stop {
    Done,
    Fail(FatalCause),
}

/// Use case for verifying an artifact with a quorum of verifiers
pub struct RunVerificationUseCase {
    pool: Arc<VerifierPool>,
    controller: RegenerationController,
    params: VerificationParams,
    logger: Arc<dyn VerificationLogger>,
}

impl RunVerificationUseCase {
    pub fn new(
        pool: Arc<VerifierPool>,
        producer: Arc<dyn ArtifactProducer>,
        params: VerificationParams,
    ) -> Self {
        let controller = RegenerationController::new(producer, params.backoff.clone());
        Self {
            pool,
            controller,
            params,
            logger: Arc::new(NoVerificationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn VerificationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &VerificationParams {
        &self.params
    }

    /// Run a session on its own task.
    pub fn spawn(
        self: Arc<Self>,
        request: VerificationRequest,
        progress: Arc<dyn VerificationProgressNotifier>,
        cancel: CancellationToken,
    ) -> JoinHandle<SessionOutcome> {
        tokio::spawn(async move { self.execute(request, progress.as_ref(), cancel).await })
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute_quiet(
        &self,
        request: VerificationRequest,
        cancel: CancellationToken,
    ) -> SessionOutcome {
        self.execute(request, &NoProgress, cancel).await
    }

    /// Run one session to its terminal outcome.
    ///
    /// Never returns an error: every failure is folded into
    /// [`SessionOutcome::FatalError`] with the history gathered so far.
    pub async fn execute(
        &self,
        request: VerificationRequest,
        progress: &dyn VerificationProgressNotifier,
        cancel: CancellationToken,
    ) -> SessionOutcome {
        let session_id = SessionId::generate();
        let (artifact, failures) = match request {
            VerificationRequest::Artifact(artifact) => (artifact, Vec::new()),
            VerificationRequest::Task(task) => {
                match self
                    .initial_artifact(&session_id, &task, progress, &cancel)
                    .await
                {
                    Ok(generated) => generated,
                    Err(outcome) => return self.conclude(outcome, progress),
                }
            }
        };

        let mut session = VerificationSession::new(artifact, self.params.limits())
            .with_id(session_id)
            .with_failed_generations(failures);
        info!(
            "Session {} started: artifact {} ({}), {} verifiers, rule {}",
            session.id(),
            session.artifact().id,
            session.artifact().content.kind(),
            self.pool.len(),
            self.params.policy.rule
        );
        progress.on_session_start(session.id(), session.artifact(), self.pool.len());
        self.logger.log(VerificationEvent::new(
            "session_started",
            json!({
                "session_id": session.id(),
                "artifact_id": session.artifact().id,
                "task": session.artifact().task,
                "verifiers": self.pool.ids(),
                "rule": self.params.policy.rule.to_string(),
                "max_attempts": self.params.max_attempts,
            }),
        ));

        let outcome = match self.drive(&mut session, progress, &cancel).await {
            Ok(Stop::Done) => session.finish_or(FatalCause::Internal {
                message: "session stopped before reaching a terminal state".to_string(),
            }),
            Ok(Stop::Fail(cause)) => session.finish_or(cause),
            Err(e) => {
                error!("Session {} broke its state machine: {}", session.id(), e);
                session.finish_or(FatalCause::Internal {
                    message: e.to_string(),
                })
            }
        };

        self.conclude(outcome, progress)
    }

    /// Ask the producer for the first artifact. Each failed try consumes an
    /// attempt; the session is fatal once every attempt failed.
    async fn initial_artifact(
        &self,
        session_id: &SessionId,
        task: &str,
        progress: &dyn VerificationProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<(Artifact, Vec<ProducerFailure>), SessionOutcome> {
        let max_attempts = self.params.limits().max_attempts;
        let mut failures = Vec::new();

        let cause = loop {
            let attempt = failures.len() as u32 + 1;
            let failure = match self.controller.generate(task, attempt, cancel).await {
                Ok(artifact) => return Ok((artifact, failures)),
                Err(RegenerationError::Cancelled) => break FatalCause::Cancelled,
                Err(RegenerationError::Producer(e)) if e.is_permanent() => {
                    break FatalCause::ProducerUnavailable {
                        message: e.to_string(),
                    };
                }
                Err(RegenerationError::Producer(e)) => e,
            };

            warn!(
                "Producer {} failed initial generation (attempt {}/{}): {}",
                self.controller.producer_name(),
                attempt,
                max_attempts,
                failure
            );
            progress.on_producer_failure(attempt, &failure.to_string());
            self.logger.log(VerificationEvent::new(
                "producer_failed",
                json!({
                    "session_id": session_id,
                    "attempt": attempt,
                    "error": failure.to_string(),
                }),
            ));
            failures.push(ProducerFailure {
                attempt,
                message: failure.to_string(),
            });

            if attempt >= max_attempts {
                break FatalCause::ProducerNeverSucceeded {
                    message: failure.to_string(),
                };
            }
        };

        warn!("Initial generation failed: {}", cause);
        Err(SessionOutcome::FatalError {
            cause,
            last_artifact: None,
            report: SessionReport::empty(session_id.clone(), max_attempts)
                .with_producer_failures(failures),
        })
    }

    async fn drive(
        &self,
        session: &mut VerificationSession,
        progress: &dyn VerificationProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<Stop, DomainError> {
        if let Err(e) = session.artifact().validate() {
            return Ok(Stop::Fail(FatalCause::InvalidArtifact {
                message: e.to_string(),
            }));
        }
        if self.pool.is_empty() {
            return Ok(Stop::Fail(FatalCause::NoVerifiers));
        }

        session.start()?;

        loop {
            if cancel.is_cancelled() {
                return Ok(Stop::Fail(FatalCause::Cancelled));
            }

            let round = session.next_round();
            let timeout = self.params.timeout_for(session.reevaluations());
            progress.on_round_start(round, session.attempt(), self.pool.len(), timeout);
            info!(
                "Round {} (attempt {}/{}): {} verifiers, timeout {:?}",
                round,
                session.attempt(),
                self.params.max_attempts,
                self.pool.len(),
                timeout
            );

            let result = match self
                .pool
                .evaluate(session.artifact(), timeout, cancel, progress)
                .await
            {
                Ok(result) => result,
                Err(e) => return Ok(Stop::Fail(pool_failure(e))),
            };

            let decision = aggregate(&result, &self.params.policy, round, session.attempt());
            info!(
                "Round {} decision: {:?} ({})",
                round,
                decision.outcome,
                decision.vote_summary()
            );
            progress.on_decision(&decision);
            self.logger.log(VerificationEvent::new(
                "round_completed",
                json!({
                    "session_id": session.id(),
                    "decision": decision,
                }),
            ));

            match session.record_decision(decision)? {
                SessionAction::Accept | SessionAction::Exhaust | SessionAction::Fail(_) => {
                    return Ok(Stop::Done);
                }
                SessionAction::Reevaluate { reevaluation } => {
                    warn!(
                        "Round {} inconclusive, re-evaluating ({}/{})",
                        round, reevaluation, self.params.max_reevaluations
                    );
                    self.logger.log(VerificationEvent::new(
                        "reevaluation_requested",
                        json!({
                            "session_id": session.id(),
                            "round": round,
                            "reevaluation": reevaluation,
                        }),
                    ));
                }
                SessionAction::Regenerate {
                    request,
                    regeneration,
                } => {
                    if let Some(stop) = self
                        .regenerate(session, request, regeneration, progress, cancel)
                        .await?
                    {
                        return Ok(stop);
                    }
                }
            }
        }
    }

    /// Obtain the next artifact. `None` means the session is evaluating again.
    async fn regenerate(
        &self,
        session: &mut VerificationSession,
        mut request: CorrectionRequest,
        mut regeneration: u32,
        progress: &dyn VerificationProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<Option<Stop>, DomainError> {
        loop {
            let delay = self.controller.delay_for(regeneration);
            progress.on_regeneration(&request, regeneration, delay);
            self.logger.log(VerificationEvent::new(
                "regeneration_requested",
                json!({
                    "session_id": session.id(),
                    "regeneration": regeneration,
                    "delay_ms": delay.as_millis() as u64,
                    "correction": request,
                }),
            ));

            let failure = match self
                .controller
                .regenerate(session.artifact(), &request, regeneration, cancel)
                .await
            {
                Ok(artifact) => {
                    session.record_regenerated(artifact)?;
                    return Ok(None);
                }
                Err(RegenerationError::Cancelled) => {
                    return Ok(Some(Stop::Fail(FatalCause::Cancelled)));
                }
                Err(RegenerationError::Producer(e)) if e.is_permanent() => {
                    return Ok(Some(Stop::Fail(FatalCause::ProducerUnavailable {
                        message: e.to_string(),
                    })));
                }
                Err(RegenerationError::Producer(e)) => e,
            };

            warn!(
                "Producer {} failed regeneration {}: {}",
                self.controller.producer_name(),
                regeneration,
                failure
            );
            progress.on_producer_failure(session.attempt() + 1, &failure.to_string());
            self.logger.log(VerificationEvent::new(
                "producer_failed",
                json!({
                    "session_id": session.id(),
                    "attempt": session.attempt() + 1,
                    "error": failure.to_string(),
                }),
            ));

            match session.record_producer_failure(failure.to_string())? {
                SessionAction::Regenerate {
                    request: next,
                    regeneration: n,
                } => {
                    request = next;
                    regeneration = n;
                }
                _ => return Ok(Some(Stop::Done)),
            }
        }
    }

    fn conclude(
        &self,
        outcome: SessionOutcome,
        progress: &dyn VerificationProgressNotifier,
    ) -> SessionOutcome {
        let report = outcome.report();
        match outcome.fatal_cause() {
            Some(cause) => warn!(
                "Session {} finished: {} ({}) after {} rounds",
                report.session_id,
                outcome.label(),
                cause,
                report.rounds()
            ),
            None => info!(
                "Session {} finished: {} after {} rounds, {} attempts",
                report.session_id,
                outcome.label(),
                report.rounds(),
                report.attempts
            ),
        }

        progress.on_outcome(&outcome);
        self.logger.log(VerificationEvent::new(
            "session_finished",
            json!({
                "session_id": report.session_id,
                "outcome": outcome.label(),
                "cause": outcome.fatal_cause().map(|c| c.to_string()),
                "attempts": report.attempts,
                "rounds": report.rounds(),
                "artifact_id": outcome.artifact().map(|a| a.id.clone()),
            }),
        ));
        outcome
    }
}

fn pool_failure(error: PoolError) -> FatalCause {
    match error {
        PoolError::Cancelled => FatalCause::Cancelled,
        PoolError::NoVerifiers => FatalCause::NoVerifiers,
        PoolError::EmptyArtifact => FatalCause::InvalidArtifact {
            message: error.to_string(),
        },
        PoolError::InvalidTimeout => FatalCause::InvalidConfiguration {
            message: error.to_string(),
        },
    }
}
