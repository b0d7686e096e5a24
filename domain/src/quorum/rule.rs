//! Quorum rules for consensus determination
//!
//! This module defines the rules used to determine whether enough verifiers
//! approved an artifact.

use serde::{Deserialize, Serialize};

/// Rule for determining Quorum consensus
///
/// All counts are taken over *completed* verifiers; verifiers that timed out
/// or failed never count toward the denominator.
///
/// - `StrictMajority`: more than half must approve, and at least 2 when 3 or
///   more verifiers were dispatched (default)
/// - `Majority`: more than half must approve
/// - `Unanimous`: all must approve (strictest)
/// - `AtLeast(n)`: at least n must approve
/// - `Percentage(p)`: at least p% must approve
///
/// Whatever the rule, a round where exactly half approve is a tie and is
/// never satisfied.
///
/// # Example
///
/// ```
/// use supervisor_domain::quorum::QuorumRule;
///
/// let rule = QuorumRule::StrictMajority;
/// assert!(rule.is_satisfied(2, 3, 3));  // 2 of 3
/// assert!(!rule.is_satisfied(1, 2, 3)); // 1 of 2 completed is a tie
///
/// let strict = QuorumRule::Unanimous;
/// assert!(strict.is_satisfied(3, 3, 3));
/// assert!(!strict.is_satisfied(2, 3, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuorumRule {
    /// More than half of completed verifiers, floor of 2 when N ≥ 3
    #[default]
    StrictMajority,

    /// More than half must approve (n/2 + 1)
    Majority,

    /// All completed verifiers must approve
    Unanimous,

    /// At least n verifiers must approve
    AtLeast(usize),

    /// At least this percentage must approve (0-100)
    Percentage(u8),
}

impl QuorumRule {
    /// Minimum approvals needed given the completed and dispatched counts.
    ///
    /// Never less than 1: an artifact is not accepted without any approval.
    pub fn min_approvals_needed(&self, completed: usize, dispatched: usize) -> usize {
        let needed = match self {
            QuorumRule::StrictMajority => {
                let floor = if dispatched >= 3 { 2 } else { 0 };
                (completed / 2 + 1).max(floor)
            }
            QuorumRule::Majority => completed / 2 + 1,
            QuorumRule::Unanimous => completed,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => {
                (completed as f64 * (*p as f64 / 100.0)).ceil() as usize
            }
        };
        needed.max(1)
    }

    /// Check if the rule is satisfied
    pub fn is_satisfied(&self, approvals: usize, completed: usize, dispatched: usize) -> bool {
        if completed == 0 {
            return false;
        }
        if Self::is_tie(approvals, completed) {
            return false;
        }
        approvals >= self.min_approvals_needed(completed, dispatched)
    }

    /// Exactly half of the completed verifiers approved
    pub fn is_tie(approvals: usize, completed: usize) -> bool {
        completed > 0 && approvals * 2 == completed
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::StrictMajority => "strict majority (more than half, at least 2)".to_string(),
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (all must approve)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} approvals", n),
            QuorumRule::Percentage(p) => format!("at least {}% approval", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict_majority" | "strict-majority" | "strict" => Ok(QuorumRule::StrictMajority),
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or("Missing number after atleast:")?
                    .parse()
                    .map_err(|_| "Invalid number for atleast")?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| "Invalid percentage")?;
                if p > 100 {
                    return Err(format!("Percentage out of range: {}", p));
                }
                Ok(QuorumRule::Percentage(p))
            }
            _ => Err(format!(
                "Unknown quorum rule: {}. Valid: strict_majority, majority, unanimous, atleast:N, percentage:N or N%",
                s
            )),
        }
    }
}
