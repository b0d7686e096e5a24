//! Verification setup validation.
//!
//! Checks the combination of verifier pool, quorum policy and timeouts for
//! setups that cannot work or that weaken the consensus guarantee. Issues
//! carry a severity: errors abort startup, warnings are reported and the run
//! continues.
//!
//! # Examples
//!
//! ```
//! use supervisor_domain::QuorumPolicy;
//! use supervisor_domain::config::{ConfigIssueCode, PoolSetup, Severity};
//!
//! let setup = PoolSetup {
//!     verifier_ids: vec!["lint".to_string()],
//!     policy: QuorumPolicy::default(),
//!     per_verifier_timeout_ms: 30_000,
//!     max_attempts: 3,
//! };
//! let issues = setup.validate();
//! assert!(issues.iter().any(|i| i.code == ConfigIssueCode::FewVerifiers));
//! assert!(issues.iter().all(|i| i.severity == Severity::Warning));
//! ```

use crate::quorum::{QuorumPolicy, QuorumRule};
use std::collections::HashSet;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// No verifier configured: nothing can approve.
    NoVerifiers,
    /// Fewer than two verifiers: no independent cross-check.
    FewVerifiers,
    /// Two verifiers share an id, so their verdicts are indistinguishable.
    DuplicateVerifierId,
    /// `min_completed` is larger than the pool and is clamped.
    MinCompletedExceedsPool,
    /// The rule asks for more approvals than there are verifiers.
    RuleUnsatisfiable,
    /// A string field holds a value outside its accepted set.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A command-backed component has no command.
    MissingCommand { component: String },
    /// Per-verifier timeout is zero.
    ZeroTimeout,
    /// `max_attempts` is zero and is raised to one.
    ZeroAttempts,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// The resolved verifier pool and policy to check.
#[derive(Debug, Clone)]
pub struct PoolSetup {
    pub verifier_ids: Vec<String>,
    pub policy: QuorumPolicy,
    pub per_verifier_timeout_ms: u64,
    pub max_attempts: u32,
}

impl PoolSetup {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let count = self.verifier_ids.len();

        match count {
            0 => issues.push(ConfigIssue::error(
                ConfigIssueCode::NoVerifiers,
                "no verifiers configured; add at least one [[verifiers]] entry",
            )),
            1 => issues.push(ConfigIssue::warning(
                ConfigIssueCode::FewVerifiers,
                "only one verifier configured; consensus degenerates to a single opinion",
            )),
            _ => {}
        }

        let mut seen = HashSet::new();
        for id in &self.verifier_ids {
            if !seen.insert(id.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateVerifierId,
                    format!("verifier id '{}' is used more than once", id),
                ));
            }
        }

        if count > 0 && self.policy.min_completed > count {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MinCompletedExceedsPool,
                format!(
                    "min_completed = {} exceeds the {} configured verifier(s); clamped to {}",
                    self.policy.min_completed, count, count
                ),
            ));
        }

        if let QuorumRule::AtLeast(n) = self.policy.rule
            && count > 0
            && n > count
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::RuleUnsatisfiable,
                format!(
                    "rule '{}' needs {} approvals but only {} verifier(s) exist; nothing can be accepted",
                    self.policy.rule, n, count
                ),
            ));
        }

        if self.per_verifier_timeout_ms == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "per-verifier timeout must be greater than zero",
            ));
        }

        if self.max_attempts == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroAttempts,
                "max_attempts = 0 is raised to 1",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(ids: &[&str]) -> PoolSetup {
        PoolSetup {
            verifier_ids: ids.iter().map(|s| s.to_string()).collect(),
            policy: QuorumPolicy::default(),
            per_verifier_timeout_ms: 1_000,
            max_attempts: 3,
        }
    }

    #[test]
    fn three_verifiers_is_valid() {
        assert!(setup(&["a", "b", "c"]).validate().is_empty());
    }

    #[test]
    fn empty_pool_is_an_error() {
        let issues = setup(&[]).validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::NoVerifiers);
        assert!(issues[0].is_error());
    }

    #[test]
    fn duplicate_ids_are_errors() {
        let issues = setup(&["a", "b", "a"]).validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::DuplicateVerifierId);
        assert!(issues[0].message.contains("'a'"));
    }

    #[test]
    fn min_completed_larger_than_pool_warns() {
        let mut s = setup(&["a", "b"]);
        s.policy = QuorumPolicy::default().with_min_completed(5);
        let issues = s.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].code, ConfigIssueCode::MinCompletedExceedsPool);
    }

    #[test]
    fn at_least_above_pool_warns() {
        let mut s = setup(&["a", "b", "c"]);
        s.policy = QuorumPolicy::default().with_rule(QuorumRule::AtLeast(4));
        let issues = s.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::RuleUnsatisfiable);
    }

    #[test]
    fn zero_timeout_and_attempts() {
        let mut s = setup(&["a", "b", "c"]);
        s.per_verifier_timeout_ms = 0;
        s.max_attempts = 0;
        let codes: Vec<_> = s.validate().into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![ConfigIssueCode::ZeroTimeout, ConfigIssueCode::ZeroAttempts]
        );
    }
}
