//! Quorum policy: the rule plus the eligibility floor

use super::rule::QuorumRule;
use serde::{Deserialize, Serialize};

/// Complete quorum configuration for one verifier pool
///
/// `min_completed` is the number of verifiers that must finish before the
/// rule is applied at all; below it a round is inconclusive. It is clamped
/// to the number of dispatched verifiers so that a pool smaller than the
/// configured floor can still reach a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumPolicy {
    pub rule: QuorumRule,
    pub min_completed: usize,
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        Self {
            rule: QuorumRule::StrictMajority,
            min_completed: 2,
        }
    }
}

impl QuorumPolicy {
    pub fn new(rule: QuorumRule, min_completed: usize) -> Self {
        Self {
            rule,
            min_completed,
        }
    }

    pub fn with_rule(mut self, rule: QuorumRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_min_completed(mut self, min_completed: usize) -> Self {
        self.min_completed = min_completed;
        self
    }

    /// Eligibility floor actually applied for a round of `dispatched` verifiers
    pub fn effective_min_completed(&self, dispatched: usize) -> usize {
        self.min_completed.min(dispatched).max(1)
    }

    /// Whether enough verifiers completed to apply the rule
    pub fn is_eligible(&self, completed: usize, dispatched: usize) -> bool {
        completed >= self.effective_min_completed(dispatched)
    }
}
