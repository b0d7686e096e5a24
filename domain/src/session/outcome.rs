//! Terminal session outcomes
//!
//! Every session ends in exactly one of three outcomes, each carrying the
//! full diagnostic history. Exhausting retries is a legitimate result, not an
//! error.

use super::entities::{ProducerFailure, SessionId};
use super::state::SessionState;
use crate::artifact::Artifact;
use crate::quorum::Decision;
use serde::{Deserialize, Serialize};

/// Why a session ended in `FatalError`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum FatalCause {
    /// The caller cancelled the session
    Cancelled,
    /// The producer reported it can no longer produce artifacts
    ProducerUnavailable { message: String },
    /// The producer failed before any artifact was ever reviewed
    ProducerNeverSucceeded { message: String },
    /// Too few verifiers completed, even after re-evaluation
    QuorumUnreachable { inconclusive_rounds: u32 },
    /// The artifact cannot be reviewed (e.g. empty content)
    InvalidArtifact { message: String },
    /// The verifier pool has nothing to dispatch to
    NoVerifiers,
    /// Parameters make evaluation impossible (e.g. a zero timeout)
    InvalidConfiguration { message: String },
    /// The session driver broke an invariant
    Internal { message: String },
}

impl FatalCause {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FatalCause::Cancelled)
    }
}

impl std::fmt::Display for FatalCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FatalCause::Cancelled => write!(f, "cancelled"),
            FatalCause::ProducerUnavailable { message } => {
                write!(f, "artifact producer unavailable: {}", message)
            }
            FatalCause::ProducerNeverSucceeded { message } => {
                write!(f, "artifact producer never succeeded: {}", message)
            }
            FatalCause::QuorumUnreachable {
                inconclusive_rounds,
            } => write!(
                f,
                "quorum unreachable: too few verifiers completed in {} consecutive rounds",
                inconclusive_rounds
            ),
            FatalCause::InvalidArtifact { message } => write!(f, "invalid artifact: {}", message),
            FatalCause::NoVerifiers => write!(f, "no verifiers configured"),
            FatalCause::InvalidConfiguration { message } => {
                write!(f, "invalid configuration: {}", message)
            }
            FatalCause::Internal { message } => write!(f, "internal error: {}", message),
        }
    }
}

/// Diagnostic history attached to every outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: SessionId,
    /// Last attempt number reached
    pub attempts: u32,
    pub max_attempts: u32,
    /// Every decision, in round order
    pub history: Vec<Decision>,
    /// Producer failures that consumed attempts
    pub producer_failures: Vec<ProducerFailure>,
    /// States visited, in order
    pub trail: Vec<SessionState>,
}

impl SessionReport {
    /// Report for a session that never got an artifact to review
    pub fn empty(session_id: SessionId, max_attempts: u32) -> Self {
        Self {
            session_id,
            attempts: 0,
            max_attempts,
            history: Vec::new(),
            producer_failures: Vec::new(),
            trail: vec![SessionState::Pending, SessionState::FatalError],
        }
    }

    /// Empty report whose attempts were all spent on failed generations
    pub fn with_producer_failures(mut self, failures: Vec<ProducerFailure>) -> Self {
        self.attempts = failures.len() as u32;
        self.producer_failures = failures;
        self
    }

    pub fn rounds(&self) -> usize {
        self.history.len()
    }

    pub fn last_decision(&self) -> Option<&Decision> {
        self.history.last()
    }
}

/// The single terminal result returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Quorum accepted this artifact
    Accepted {
        artifact: Artifact,
        report: SessionReport,
    },
    /// No attempt was accepted; the last artifact is kept for human review
    ExhaustedRetries {
        last_artifact: Artifact,
        report: SessionReport,
    },
    /// Unrecoverable failure
    FatalError {
        cause: FatalCause,
        last_artifact: Option<Artifact>,
        report: SessionReport,
    },
}

impl SessionOutcome {
    pub fn report(&self) -> &SessionReport {
        match self {
            SessionOutcome::Accepted { report, .. }
            | SessionOutcome::ExhaustedRetries { report, .. }
            | SessionOutcome::FatalError { report, .. } => report,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SessionOutcome::Accepted { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, SessionOutcome::ExhaustedRetries { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionOutcome::FatalError { .. })
    }

    pub fn fatal_cause(&self) -> Option<&FatalCause> {
        match self {
            SessionOutcome::FatalError { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// The artifact to surface: the accepted one, or the last one reviewed
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            SessionOutcome::Accepted { artifact, .. } => Some(artifact),
            SessionOutcome::ExhaustedRetries { last_artifact, .. } => Some(last_artifact),
            SessionOutcome::FatalError { last_artifact, .. } => last_artifact.as_ref(),
        }
    }

    /// Short label for logs and exit status
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Accepted { .. } => "accepted",
            SessionOutcome::ExhaustedRetries { .. } => "exhausted_retries",
            SessionOutcome::FatalError { .. } => "fatal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_display() {
        assert_eq!(FatalCause::Cancelled.to_string(), "cancelled");
        assert!(FatalCause::Cancelled.is_cancelled());
        assert!(!FatalCause::NoVerifiers.is_cancelled());
    }

    #[test]
    fn test_empty_report_outcome() {
        let outcome = SessionOutcome::FatalError {
            cause: FatalCause::ProducerNeverSucceeded {
                message: "model offline".to_string(),
            },
            last_artifact: None,
            report: SessionReport::empty(SessionId::new("s-1"), 3),
        };
        assert!(outcome.is_fatal());
        assert!(outcome.artifact().is_none());
        assert_eq!(outcome.report().rounds(), 0);
        assert_eq!(outcome.label(), "fatal_error");
        assert_eq!(
            outcome.fatal_cause().map(|c| c.to_string()),
            Some("artifact producer never succeeded: model offline".to_string())
        );
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = SessionOutcome::FatalError {
            cause: FatalCause::Cancelled,
            last_artifact: None,
            report: SessionReport::empty(SessionId::new("s-2"), 1),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "fatal_error");
        assert_eq!(json["cause"]["cause"], "cancelled");
    }
}
