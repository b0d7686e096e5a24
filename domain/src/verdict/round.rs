//! Round results
//!
//! A [`RoundResult`] is what the verifier pool hands to the aggregator: one
//! verdict per dispatched verifier, did-not-complete placeholders included.

use super::verdict::Verdict;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// All verdicts collected for one evaluation round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// One verdict per dispatched verifier, in registration order
    pub verdicts: Vec<Verdict>,
    /// Wall-clock duration of the whole round in milliseconds
    pub elapsed_ms: u64,
}

impl RoundResult {
    pub fn new(verdicts: Vec<Verdict>, elapsed: Duration) -> Self {
        Self {
            verdicts,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Number of verifiers dispatched (every verdict, completed or not)
    pub fn dispatched(&self) -> usize {
        self.verdicts.len()
    }

    /// Number of verifiers that produced an opinion
    pub fn completed(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_completed()).count()
    }

    /// Number of completed approvals
    pub fn approvals(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_approval()).count()
    }

    /// Completed verdicts that did not approve
    pub fn rejections(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.is_rejection())
    }

    /// Verdicts from verifiers that timed out or failed
    pub fn non_completed(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.is_completed())
    }

    /// Generate a visual vote summary (e.g., "[●●○-]")
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for verdict in &self.verdicts {
            summary.push(verdict.symbol());
        }
        summary.push(']');
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::issue::{Issue, IssueCategory};

    fn sample() -> RoundResult {
        RoundResult::new(
            vec![
                Verdict::approve("a"),
                Verdict::reject("b", vec![Issue::major(IssueCategory::Logic, "wrong")]),
                Verdict::timed_out("c", Duration::from_millis(10)),
                Verdict::approve("d"),
            ],
            Duration::from_millis(42),
        )
    }

    #[test]
    fn test_counts() {
        let round = sample();
        assert_eq!(round.dispatched(), 4);
        assert_eq!(round.completed(), 3);
        assert_eq!(round.approvals(), 2);
        assert_eq!(round.rejections().count(), 1);
        assert_eq!(round.non_completed().count(), 1);
        assert_eq!(round.elapsed_ms, 42);
    }

    #[test]
    fn test_vote_summary() {
        assert_eq!(sample().vote_summary(), "[●○-●]");
    }
}
