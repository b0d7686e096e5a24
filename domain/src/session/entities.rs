//! Verification session entities

use super::outcome::{FatalCause, SessionOutcome, SessionReport};
use super::state::SessionState;
use crate::artifact::Artifact;
use crate::core::error::DomainError;
use crate::quorum::{Decision, DecisionOutcome};
use crate::regeneration::CorrectionRequest;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_SESSION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a verification session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let seq = NEXT_SESSION_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("session-{}-{}", millis, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Budgets bounding a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLimits {
    /// Total artifacts that may be produced, the initial one included
    pub max_attempts: u32,
    /// Inconclusive rounds tolerated per artifact before giving up
    pub max_reevaluations: u32,
}

impl SessionLimits {
    pub fn new(max_attempts: u32, max_reevaluations: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            max_reevaluations,
        }
    }
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self::new(3, 1)
    }
}

/// A producer failure that consumed an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerFailure {
    pub attempt: u32,
    pub message: String,
}

/// What the driver must do next
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Terminal: accepted
    Accept,
    /// Dispatch the same artifact again
    Reevaluate { reevaluation: u32 },
    /// Ask the producer for a corrected artifact
    Regenerate {
        request: CorrectionRequest,
        /// 1-based count of regeneration requests, used for backoff
        regeneration: u32,
    },
    /// Terminal: attempts exhausted
    Exhaust,
    /// Terminal: unrecoverable
    Fail(FatalCause),
}

impl SessionAction {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionAction::Accept | SessionAction::Exhaust | SessionAction::Fail(_)
        )
    }
}

/// State machine for one artifact's verification lifecycle
///
/// The session owns attempt numbering: the initial artifact is attempt 1 and
/// every artifact handed to [`record_regenerated`](Self::record_regenerated)
/// is renumbered to the next attempt.
#[derive(Debug, Clone)]
pub struct VerificationSession {
    id: SessionId,
    artifact: Artifact,
    limits: SessionLimits,
    attempt: u32,
    state: SessionState,
    history: Vec<Decision>,
    producer_failures: Vec<ProducerFailure>,
    trail: Vec<SessionState>,
    reevaluations: u32,
    regenerations: u32,
    rounds: u32,
    pending_correction: Option<CorrectionRequest>,
    fatal: Option<FatalCause>,
}

impl VerificationSession {
    pub fn new(artifact: Artifact, limits: SessionLimits) -> Self {
        Self {
            id: SessionId::generate(),
            artifact: artifact.with_attempt(1),
            limits,
            attempt: 1,
            state: SessionState::Pending,
            history: Vec::new(),
            producer_failures: Vec::new(),
            trail: vec![SessionState::Pending],
            reevaluations: 0,
            regenerations: 0,
            rounds: 0,
            pending_correction: None,
            fatal: None,
        }
    }

    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = id;
        self
    }

    /// Account for initial generations that failed before this artifact
    /// arrived. Each failure consumed one attempt, so the artifact is
    /// renumbered to the attempt after the last failure.
    pub fn with_failed_generations(mut self, failures: Vec<ProducerFailure>) -> Self {
        self.attempt = failures.len() as u32 + 1;
        self.artifact = self.artifact.with_attempt(self.attempt);
        self.producer_failures = failures;
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn history(&self) -> &[Decision] {
        &self.history
    }

    pub fn trail(&self) -> &[SessionState] {
        &self.trail
    }

    pub fn reevaluations(&self) -> u32 {
        self.reevaluations
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Pending → Evaluating
    pub fn start(&mut self) -> Result<(), DomainError> {
        self.expect_state(SessionState::Pending, "start")?;
        self.transition(SessionState::Evaluating);
        Ok(())
    }

    /// Allocate the next round number (1-indexed, monotonic across attempts).
    pub fn next_round(&mut self) -> u32 {
        self.rounds += 1;
        self.rounds
    }

    /// Whether another artifact may still be produced: attempts remain and
    /// the last decision did not accept.
    pub fn should_retry(&self) -> bool {
        self.attempt < self.limits.max_attempts
            && self
                .history
                .last()
                .is_some_and(|d| !d.is_accepted())
    }

    /// Feed the decision of the round just evaluated.
    pub fn record_decision(&mut self, decision: Decision) -> Result<SessionAction, DomainError> {
        self.expect_state(SessionState::Evaluating, "decision")?;
        let outcome = decision.outcome;
        self.history.push(decision);

        match outcome {
            DecisionOutcome::Accepted => {
                self.transition(SessionState::Accepted);
                Ok(SessionAction::Accept)
            }
            DecisionOutcome::Inconclusive => {
                if self.reevaluations < self.limits.max_reevaluations {
                    self.reevaluations += 1;
                    Ok(SessionAction::Reevaluate {
                        reevaluation: self.reevaluations,
                    })
                } else {
                    let cause = FatalCause::QuorumUnreachable {
                        inconclusive_rounds: self.reevaluations + 1,
                    };
                    self.enter_fatal(cause.clone());
                    Ok(SessionAction::Fail(cause))
                }
            }
            DecisionOutcome::Rejected => {
                if self.should_retry() {
                    let request = match self.history.last() {
                        Some(decision) => CorrectionRequest::from_decision(&self.artifact, decision),
                        None => return Err(self.invalid("decision")),
                    };
                    self.transition(SessionState::Regenerating);
                    Ok(self.regenerate_action(request))
                } else {
                    self.transition(SessionState::ExhaustedRetries);
                    Ok(SessionAction::Exhaust)
                }
            }
        }
    }

    /// Regenerating → Evaluating with a fresh artifact.
    pub fn record_regenerated(&mut self, artifact: Artifact) -> Result<(), DomainError> {
        self.expect_state(SessionState::Regenerating, "regenerated")?;
        self.attempt += 1;
        self.artifact = artifact.with_attempt(self.attempt);
        self.reevaluations = 0;
        self.pending_correction = None;
        self.transition(SessionState::Evaluating);
        Ok(())
    }

    /// The producer failed to regenerate; the failed try consumes an attempt.
    pub fn record_producer_failure(
        &mut self,
        message: impl Into<String>,
    ) -> Result<SessionAction, DomainError> {
        self.expect_state(SessionState::Regenerating, "producer_failure")?;
        self.attempt += 1;
        self.producer_failures.push(ProducerFailure {
            attempt: self.attempt,
            message: message.into(),
        });

        match self.pending_correction.clone() {
            Some(request) if self.should_retry() => Ok(self.regenerate_action(request)),
            _ => {
                self.transition(SessionState::ExhaustedRetries);
                Ok(SessionAction::Exhaust)
            }
        }
    }

    /// Any non-terminal state → FatalError.
    pub fn fail(&mut self, cause: FatalCause) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(self.invalid("fail"));
        }
        self.enter_fatal(cause);
        Ok(())
    }

    /// Consume a terminal session into its outcome.
    pub fn finish(self) -> Result<SessionOutcome, DomainError> {
        if !self.state.is_terminal() {
            return Err(self.invalid("finish"));
        }
        Ok(self.into_outcome())
    }

    /// Consume the session into an outcome, failing it with `cause` first
    /// if it has not reached a terminal state.
    pub fn finish_or(mut self, cause: FatalCause) -> SessionOutcome {
        if !self.state.is_terminal() {
            self.enter_fatal(cause);
        }
        self.into_outcome()
    }

    fn into_outcome(self) -> SessionOutcome {
        let report = SessionReport {
            session_id: self.id,
            attempts: self.attempt,
            max_attempts: self.limits.max_attempts,
            history: self.history,
            producer_failures: self.producer_failures,
            trail: self.trail,
        };

        match self.state {
            SessionState::Accepted => SessionOutcome::Accepted {
                artifact: self.artifact,
                report,
            },
            SessionState::ExhaustedRetries => SessionOutcome::ExhaustedRetries {
                last_artifact: self.artifact,
                report,
            },
            _ => SessionOutcome::FatalError {
                cause: self.fatal.unwrap_or(FatalCause::Internal {
                    message: "session ended without a terminal state".to_string(),
                }),
                last_artifact: Some(self.artifact),
                report,
            },
        }
    }

    fn regenerate_action(&mut self, request: CorrectionRequest) -> SessionAction {
        self.regenerations += 1;
        self.pending_correction = Some(request.clone());
        SessionAction::Regenerate {
            request,
            regeneration: self.regenerations,
        }
    }

    fn enter_fatal(&mut self, cause: FatalCause) {
        self.fatal = Some(cause);
        self.transition(SessionState::FatalError);
    }

    fn transition(&mut self, to: SessionState) {
        self.state = to;
        self.trail.push(to);
    }

    fn expect_state(&self, expected: SessionState, event: &'static str) -> Result<(), DomainError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid(event))
        }
    }

    fn invalid(&self, event: &'static str) -> DomainError {
        DomainError::InvalidTransition {
            from: self.state.to_string(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactContent;
    use crate::quorum::{QuorumPolicy, aggregate};
    use crate::verdict::{Issue, IssueCategory, RoundResult, Verdict};
    use std::time::Duration;

    fn artifact(text: &str) -> Artifact {
        Artifact::new("write a greeting", ArtifactContent::text(text))
    }

    fn decide(session: &mut VerificationSession, verdicts: Vec<Verdict>) -> Decision {
        let round = session.next_round();
        let result = RoundResult::new(verdicts, Duration::from_millis(5));
        aggregate(&result, &QuorumPolicy::default(), round, session.attempt())
    }

    fn rejected_round() -> Vec<Verdict> {
        vec![
            Verdict::reject(
                "a",
                vec![Issue::major(IssueCategory::Logic, "wrong greeting")],
            ),
            Verdict::reject(
                "b",
                vec![Issue::critical(IssueCategory::Syntax, "unterminated string")],
            ),
            Verdict::approve("c"),
        ]
    }

    fn accepted_round() -> Vec<Verdict> {
        vec![
            Verdict::approve("a"),
            Verdict::approve("b"),
            Verdict::reject("c", vec![Issue::minor(IssueCategory::Other, "style")]),
        ]
    }

    fn inconclusive_round() -> Vec<Verdict> {
        vec![
            Verdict::approve("a"),
            Verdict::timed_out("b", Duration::from_millis(10)),
            Verdict::failed("c", "crashed"),
        ]
    }

    #[test]
    fn test_accept_on_first_round() {
        let mut session = VerificationSession::new(artifact("hi"), SessionLimits::default());
        session.start().unwrap();
        let decision = decide(&mut session, accepted_round());
        let action = session.record_decision(decision).unwrap();
        assert_eq!(action, SessionAction::Accept);

        let outcome = session.finish().unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(outcome.report().attempts, 1);
        assert_eq!(
            outcome.report().trail,
            vec![
                SessionState::Pending,
                SessionState::Evaluating,
                SessionState::Accepted
            ]
        );
    }

    #[test]
    fn test_failed_generations_consume_attempts() {
        let failures = vec![ProducerFailure {
            attempt: 1,
            message: "timed out".to_string(),
        }];
        let mut session = VerificationSession::new(artifact("hi"), SessionLimits::new(2, 1))
            .with_failed_generations(failures);
        assert_eq!(session.attempt(), 2);
        assert_eq!(session.artifact().attempt, 2);

        session.start().unwrap();
        let decision = decide(&mut session, rejected_round());
        assert_eq!(session.record_decision(decision).unwrap(), SessionAction::Exhaust);

        let outcome = session.finish().unwrap();
        assert_eq!(outcome.report().attempts, 2);
        assert_eq!(outcome.report().producer_failures.len(), 1);
    }

    #[test]
    fn test_exhausts_after_max_attempts() {
        let mut session = VerificationSession::new(artifact("v1"), SessionLimits::new(3, 1));
        session.start().unwrap();

        let mut attempts_seen = Vec::new();
        let mut regenerations = Vec::new();
        loop {
            attempts_seen.push(session.attempt());
            let decision = decide(&mut session, rejected_round());
            match session.record_decision(decision).unwrap() {
                SessionAction::Regenerate {
                    request,
                    regeneration,
                } => {
                    assert!(request.has_critical());
                    regenerations.push(regeneration);
                    let next = session.artifact().regenerated(ArtifactContent::text("v"));
                    session.record_regenerated(next).unwrap();
                }
                SessionAction::Exhaust => break,
                other => panic!("unexpected action: {:?}", other),
            }
        }

        assert_eq!(attempts_seen, vec![1, 2, 3]);
        assert_eq!(regenerations, vec![1, 2]);

        let outcome = session.finish().unwrap();
        assert!(outcome.is_exhausted());
        let report = outcome.report();
        assert_eq!(report.history.len(), 3);
        assert_eq!(
            report.trail,
            vec![
                SessionState::Pending,
                SessionState::Evaluating,
                SessionState::Regenerating,
                SessionState::Evaluating,
                SessionState::Regenerating,
                SessionState::Evaluating,
                SessionState::ExhaustedRetries,
            ]
        );
        assert_eq!(outcome.artifact().map(|a| a.attempt), Some(3));
    }

    #[test]
    fn test_single_attempt_rejection_is_exhausted() {
        let mut session = VerificationSession::new(artifact("v1"), SessionLimits::new(1, 0));
        session.start().unwrap();
        let decision = decide(&mut session, rejected_round());
        assert_eq!(session.record_decision(decision).unwrap(), SessionAction::Exhaust);
        assert!(session.finish().unwrap().is_exhausted());
    }

    #[test]
    fn test_inconclusive_reevaluates_then_fails() {
        let mut session = VerificationSession::new(artifact("v1"), SessionLimits::new(3, 1));
        session.start().unwrap();

        let decision = decide(&mut session, inconclusive_round());
        assert_eq!(
            session.record_decision(decision).unwrap(),
            SessionAction::Reevaluate { reevaluation: 1 }
        );
        assert_eq!(session.state(), SessionState::Evaluating);

        let decision = decide(&mut session, inconclusive_round());
        let action = session.record_decision(decision).unwrap();
        assert_eq!(
            action,
            SessionAction::Fail(FatalCause::QuorumUnreachable {
                inconclusive_rounds: 2
            })
        );

        let outcome = session.finish().unwrap();
        assert!(outcome.is_fatal());
        assert_eq!(outcome.report().history.len(), 2);
        assert_eq!(outcome.report().history[1].round, 2);
    }

    #[test]
    fn test_reevaluation_budget_resets_per_artifact() {
        let mut session = VerificationSession::new(artifact("v1"), SessionLimits::new(3, 1));
        session.start().unwrap();

        let decision = decide(&mut session, inconclusive_round());
        session.record_decision(decision).unwrap();
        let decision = decide(&mut session, rejected_round());
        assert!(matches!(
            session.record_decision(decision).unwrap(),
            SessionAction::Regenerate { .. }
        ));
        let next = session.artifact().regenerated(ArtifactContent::text("v2"));
        session.record_regenerated(next).unwrap();
        assert_eq!(session.reevaluations(), 0);

        let decision = decide(&mut session, inconclusive_round());
        assert_eq!(
            session.record_decision(decision).unwrap(),
            SessionAction::Reevaluate { reevaluation: 1 }
        );
    }

    #[test]
    fn test_producer_failure_consumes_attempt() {
        let mut session = VerificationSession::new(artifact("v1"), SessionLimits::new(3, 0));
        session.start().unwrap();
        let decision = decide(&mut session, rejected_round());
        session.record_decision(decision).unwrap();

        // attempt 2 fails, attempt 3 is still allowed
        let action = session.record_producer_failure("rate limited").unwrap();
        assert!(matches!(
            action,
            SessionAction::Regenerate {
                regeneration: 2,
                ..
            }
        ));
        assert_eq!(session.attempt(), 2);

        // attempt 3 fails too
        assert_eq!(
            session.record_producer_failure("rate limited").unwrap(),
            SessionAction::Exhaust
        );

        let outcome = session.finish().unwrap();
        assert!(outcome.is_exhausted());
        assert_eq!(outcome.report().producer_failures.len(), 2);
        assert_eq!(outcome.artifact().map(|a| a.attempt), Some(1));
    }

    #[test]
    fn test_fail_from_any_non_terminal_state() {
        let mut session = VerificationSession::new(artifact("v1"), SessionLimits::default());
        session.fail(FatalCause::Cancelled).unwrap();
        assert_eq!(session.state(), SessionState::FatalError);
        assert!(session.fail(FatalCause::Cancelled).is_err());

        let outcome = session.finish().unwrap();
        assert_eq!(outcome.fatal_cause(), Some(&FatalCause::Cancelled));
        assert!(outcome.artifact().is_some());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut session = VerificationSession::new(artifact("v1"), SessionLimits::default());
        let decision = decide(&mut session, accepted_round());
        assert!(matches!(
            session.record_decision(decision),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(session.record_regenerated(artifact("v2")).is_err());

        session.start().unwrap();
        assert!(session.start().is_err());
        assert!(session.clone().finish().is_err());
    }

    #[test]
    fn test_finish_or_forces_fatal() {
        let mut session = VerificationSession::new(artifact("v1"), SessionLimits::default());
        session.start().unwrap();
        let outcome = session.finish_or(FatalCause::Internal {
            message: "driver bug".to_string(),
        });
        assert!(outcome.is_fatal());
        assert_eq!(
            outcome.report().trail.last(),
            Some(&SessionState::FatalError)
        );
    }

    #[test]
    fn test_finish_or_keeps_terminal_outcome() {
        let mut session = VerificationSession::new(artifact("v1"), SessionLimits::default());
        session.start().unwrap();
        let decision = decide(&mut session, accepted_round());
        session.record_decision(decision).unwrap();
        assert!(session.finish_or(FatalCause::Cancelled).is_accepted());
    }

    #[test]
    fn test_session_renumbers_attempts() {
        let session = VerificationSession::new(
            artifact("v1").with_attempt(7),
            SessionLimits::default(),
        );
        assert_eq!(session.artifact().attempt, 1);
        assert_eq!(session.attempt(), 1);
    }

    #[test]
    fn test_limits_floor_at_one_attempt() {
        assert_eq!(SessionLimits::new(0, 0).max_attempts, 1);
    }
}
