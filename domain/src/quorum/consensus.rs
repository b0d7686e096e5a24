//! Consensus aggregation
//!
//! [`aggregate`] is a pure function from one [`RoundResult`] to exactly one
//! [`Decision`]. Re-aggregating the same round with the same policy always
//! yields an identical decision.

use super::policy::QuorumPolicy;
use super::rule::QuorumRule;
use crate::verdict::{Issue, RoundResult, Verdict, VerifierId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a consensus round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    /// Quorum reached: the artifact is acceptable
    Accepted,
    /// Quorum not reached among enough completed verifiers
    Rejected,
    /// Too few verifiers completed to apply the rule
    Inconclusive,
}

impl DecisionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DecisionOutcome::Accepted)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, DecisionOutcome::Rejected)
    }

    pub fn is_inconclusive(&self) -> bool {
        matches!(self, DecisionOutcome::Inconclusive)
    }
}

impl std::fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionOutcome::Accepted => write!(f, "Accepted"),
            DecisionOutcome::Rejected => write!(f, "Rejected"),
            DecisionOutcome::Inconclusive => write!(f, "Inconclusive"),
        }
    }
}

/// An issue after deduplication, with the verifiers that reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedIssue {
    /// The issue exactly as one of the verifiers reported it
    pub issue: Issue,
    /// Every rejecting verifier that reported this finding, in pool order
    pub reported_by: Vec<VerifierId>,
}

/// The aggregator's output for one round
///
/// # Example
///
/// ```
/// use supervisor_domain::quorum::{aggregate, DecisionOutcome, QuorumPolicy};
/// use supervisor_domain::verdict::{Issue, IssueCategory, RoundResult, Verdict};
/// use std::time::Duration;
///
/// let round = RoundResult::new(
///     vec![
///         Verdict::approve("heuristic"),
///         Verdict::approve("reviewer"),
///         Verdict::reject("tests", vec![Issue::major(IssueCategory::Logic, "test_add fails")]),
///     ],
///     Duration::from_millis(120),
/// );
///
/// let decision = aggregate(&round, &QuorumPolicy::default(), 1, 1);
/// assert_eq!(decision.outcome, DecisionOutcome::Accepted);
/// assert_eq!(decision.approvals, 2);
/// assert_eq!(decision.issues.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Round number within the session (1-indexed)
    pub round: u32,
    /// Artifact attempt this round judged
    pub attempt: u32,
    pub outcome: DecisionOutcome,
    /// Completed approvals
    pub approvals: usize,
    /// Verifiers that produced an opinion
    pub completed: usize,
    /// Verifiers dispatched, completed or not
    pub dispatched: usize,
    /// Approvals the rule required given `completed`
    pub required_approvals: usize,
    /// The rule applied
    pub rule: QuorumRule,
    /// Deduplicated issues from non-approving completed verdicts
    pub issues: Vec<MergedIssue>,
    /// Every verdict of the round, in pool order
    pub verdicts: Vec<Verdict>,
    /// Wall-clock round duration in milliseconds
    pub elapsed_ms: u64,
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        self.outcome.is_accepted()
    }

    pub fn is_rejected(&self) -> bool {
        self.outcome.is_rejected()
    }

    pub fn is_inconclusive(&self) -> bool {
        self.outcome.is_inconclusive()
    }

    /// The merged issues without their reporter annotations
    pub fn plain_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().map(|m| &m.issue)
    }

    /// Generate a visual vote summary (e.g., "[●●○]")
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for verdict in &self.verdicts {
            summary.push(verdict.symbol());
        }
        summary.push(']');
        summary
    }

    /// Identities of the verifiers that timed out or failed
    pub fn non_completed_verifiers(&self) -> Vec<&VerifierId> {
        self.verdicts
            .iter()
            .filter(|v| !v.is_completed())
            .map(|v| &v.verifier)
            .collect()
    }
}

/// Merge issues from non-approving completed verdicts.
///
/// Keeps pool order. When the same finding is reported more than once the
/// most severe report is kept and every reporter is recorded.
pub fn merge_issues(verdicts: &[Verdict]) -> Vec<MergedIssue> {
    let mut merged: Vec<MergedIssue> = Vec::new();
    let mut index = HashMap::new();

    for verdict in verdicts.iter().filter(|v| v.is_rejection()) {
        for issue in &verdict.issues {
            let key = issue.dedup_key();
            if let Some(&i) = index.get(&key) {
                let entry: &mut MergedIssue = &mut merged[i];
                if issue.severity < entry.issue.severity {
                    entry.issue = issue.clone();
                }
                if !entry.reported_by.contains(&verdict.verifier) {
                    entry.reported_by.push(verdict.verifier.clone());
                }
            } else {
                index.insert(key, merged.len());
                merged.push(MergedIssue {
                    issue: issue.clone(),
                    reported_by: vec![verdict.verifier.clone()],
                });
            }
        }
    }

    merged
}

/// Turn one round of verdicts into a decision.
///
/// `round` and `attempt` are recorded on the decision as-is.
pub fn aggregate(result: &RoundResult, policy: &QuorumPolicy, round: u32, attempt: u32) -> Decision {
    let dispatched = result.dispatched();
    let completed = result.completed();
    let approvals = result.approvals();
    let required_approvals = policy.rule.min_approvals_needed(completed, dispatched);

    let outcome = if !policy.is_eligible(completed, dispatched) {
        DecisionOutcome::Inconclusive
    } else if policy.rule.is_satisfied(approvals, completed, dispatched) {
        DecisionOutcome::Accepted
    } else {
        DecisionOutcome::Rejected
    };

    Decision {
        round,
        attempt,
        outcome,
        approvals,
        completed,
        dispatched,
        required_approvals,
        rule: policy.rule,
        issues: merge_issues(&result.verdicts),
        verdicts: result.verdicts.clone(),
        elapsed_ms: result.elapsed_ms,
    }
}
