//! Verdict types
//!
//! A [`Verdict`] is one verifier's opinion about one artifact. Verifiers that
//! time out or fail still produce a verdict, marked as did-not-complete, so
//! that the aggregator can tell "no answer" apart from "rejected".

use super::issue::Issue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stable identity of a configured verifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifierId(String);

impl VerifierId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VerifierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VerifierId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VerifierId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Why a verifier produced no opinion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NonCompletion {
    /// The per-verifier timeout elapsed
    TimedOut { after_ms: u64 },
    /// The verifier returned an error (or its task panicked)
    Failed { message: String },
}

impl std::fmt::Display for NonCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonCompletion::TimedOut { after_ms } => write!(f, "timed out after {}ms", after_ms),
            NonCompletion::Failed { message } => write!(f, "failed: {}", message),
        }
    }
}

/// Whether the verifier finished its evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Completed,
    DidNotComplete(NonCompletion),
}

/// One verifier's opinion on one artifact
///
/// # Example
///
/// ```
/// use supervisor_domain::verdict::{Issue, IssueCategory, Verdict};
///
/// let approval = Verdict::approve("heuristic");
/// assert!(approval.approved && approval.is_completed());
///
/// let rejection = Verdict::reject("tests", vec![Issue::major(IssueCategory::Logic, "test_add fails")]);
/// assert!(!rejection.approved);
/// assert_eq!(rejection.issues.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Which verifier produced this verdict
    pub verifier: VerifierId,
    /// Whether the verifier approved the artifact
    pub approved: bool,
    /// Findings backing a rejection (may also accompany an approval)
    pub issues: Vec<Issue>,
    /// Confidence level (0.0 to 1.0)
    pub confidence: f64,
    /// Wall-clock evaluation time in milliseconds
    pub elapsed_ms: u64,
    /// Completion status
    pub status: VerdictStatus,
}

impl Verdict {
    /// Create a completed verdict
    pub fn new(verifier: impl Into<VerifierId>, approved: bool, issues: Vec<Issue>) -> Self {
        Self {
            verifier: verifier.into(),
            approved,
            issues,
            confidence: 1.0,
            elapsed_ms: 0,
            status: VerdictStatus::Completed,
        }
    }

    /// Create an approval with no findings
    pub fn approve(verifier: impl Into<VerifierId>) -> Self {
        Self::new(verifier, true, Vec::new())
    }

    /// Create a rejection backed by findings
    pub fn reject(verifier: impl Into<VerifierId>, issues: Vec<Issue>) -> Self {
        Self::new(verifier, false, issues)
    }

    /// Record a verifier that hit its timeout
    pub fn timed_out(verifier: impl Into<VerifierId>, after: Duration) -> Self {
        let after_ms = after.as_millis() as u64;
        Self::did_not_complete(verifier, NonCompletion::TimedOut { after_ms }).with_elapsed(after)
    }

    /// Record a verifier that errored
    pub fn failed(verifier: impl Into<VerifierId>, message: impl Into<String>) -> Self {
        Self::did_not_complete(
            verifier,
            NonCompletion::Failed {
                message: message.into(),
            },
        )
    }

    fn did_not_complete(verifier: impl Into<VerifierId>, reason: NonCompletion) -> Self {
        Self {
            verifier: verifier.into(),
            approved: false,
            issues: Vec::new(),
            confidence: 0.0,
            elapsed_ms: 0,
            status: VerdictStatus::DidNotComplete(reason),
        }
    }

    /// Set the confidence level, clamped to `0.0..=1.0`
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = elapsed.as_millis() as u64;
        self
    }

    /// Whether the verifier finished and its opinion counts toward quorum
    pub fn is_completed(&self) -> bool {
        matches!(self.status, VerdictStatus::Completed)
    }

    /// Completed and approving
    pub fn is_approval(&self) -> bool {
        self.is_completed() && self.approved
    }

    /// Completed and not approving
    pub fn is_rejection(&self) -> bool {
        self.is_completed() && !self.approved
    }

    /// The non-completion reason, if any
    pub fn non_completion(&self) -> Option<&NonCompletion> {
        match &self.status {
            VerdictStatus::Completed => None,
            VerdictStatus::DidNotComplete(reason) => Some(reason),
        }
    }

    /// One-character summary: `●` approve, `○` reject, `-` did not complete
    pub fn symbol(&self) -> char {
        if !self.is_completed() {
            '-'
        } else if self.approved {
            '●'
        } else {
            '○'
        }
    }
}
