//! Verification parameters: session loop control.
//!
//! [`VerificationParams`] groups the static parameters that control the
//! evaluate → decide → regenerate loop in
//! [`RunVerificationUseCase`](crate::use_cases::run_verification::RunVerificationUseCase).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use supervisor_domain::{BackoffSchedule, QuorumPolicy, SessionLimits};

/// Session loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationParams {
    /// Budget for a single verifier call in the first evaluation of an artifact.
    pub per_verifier_timeout: Duration,
    /// Total artifacts per session, the initial one included.
    pub max_attempts: u32,
    /// Inconclusive rounds re-run per artifact before giving up.
    pub max_reevaluations: u32,
    /// Timeout multiplier applied on each re-evaluation.
    pub reevaluation_timeout_factor: f64,
    /// Quorum rule and minimum completed verifiers.
    pub policy: QuorumPolicy,
    /// Delay schedule between regenerations.
    pub backoff: BackoffSchedule,
}

impl Default for VerificationParams {
    fn default() -> Self {
        Self {
            per_verifier_timeout: Duration::from_secs(30),
            max_attempts: 3,
            max_reevaluations: 1,
            reevaluation_timeout_factor: 2.0,
            policy: QuorumPolicy::default(),
            backoff: BackoffSchedule::default(),
        }
    }
}

impl VerificationParams {
    // ==================== Builder Methods ====================

    pub fn with_per_verifier_timeout(mut self, timeout: Duration) -> Self {
        self.per_verifier_timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_max_reevaluations(mut self, max: u32) -> Self {
        self.max_reevaluations = max;
        self
    }

    pub fn with_reevaluation_timeout_factor(mut self, factor: f64) -> Self {
        self.reevaluation_timeout_factor = factor;
        self
    }

    pub fn with_policy(mut self, policy: QuorumPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffSchedule) -> Self {
        self.backoff = backoff;
        self
    }

    // ==================== Derived Values ====================

    pub fn limits(&self) -> SessionLimits {
        SessionLimits::new(self.max_attempts, self.max_reevaluations)
    }

    /// Per-verifier timeout for the n-th re-evaluation of an artifact
    /// (`0` = first evaluation): `timeout × factor^n`.
    ///
    /// Factors below 1 (or non-finite) never shrink the timeout; results too
    /// large to represent saturate at `Duration::MAX`.
    pub fn timeout_for(&self, reevaluation: u32) -> Duration {
        let factor = if self.reevaluation_timeout_factor.is_finite() {
            self.reevaluation_timeout_factor.max(1.0)
        } else {
            1.0
        };
        let exponent = i32::try_from(reevaluation).unwrap_or(i32::MAX);
        let secs = self.per_verifier_timeout.as_secs_f64() * factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = VerificationParams::default();
        assert_eq!(params.per_verifier_timeout, Duration::from_secs(30));
        assert_eq!(params.max_attempts, 3);
        assert_eq!(params.max_reevaluations, 1);
        assert_eq!(params.limits(), SessionLimits::new(3, 1));
    }

    #[test]
    fn test_builder_chain() {
        let params = VerificationParams::default()
            .with_per_verifier_timeout(Duration::from_millis(250))
            .with_max_attempts(5)
            .with_max_reevaluations(0)
            .with_backoff(BackoffSchedule::None);

        assert_eq!(params.per_verifier_timeout, Duration::from_millis(250));
        assert_eq!(params.limits().max_attempts, 5);
        assert_eq!(params.limits().max_reevaluations, 0);
        assert_eq!(params.backoff, BackoffSchedule::None);
    }

    #[test]
    fn test_timeout_grows_per_reevaluation() {
        let params = VerificationParams::default()
            .with_per_verifier_timeout(Duration::from_secs(10))
            .with_reevaluation_timeout_factor(1.5);

        assert_eq!(params.timeout_for(0), Duration::from_secs(10));
        assert_eq!(params.timeout_for(1), Duration::from_secs(15));
        assert_eq!(params.timeout_for(2), Duration::from_millis(22_500));
    }

    #[test]
    fn test_timeout_never_shrinks() {
        let params = VerificationParams::default()
            .with_per_verifier_timeout(Duration::from_secs(10))
            .with_reevaluation_timeout_factor(0.5);
        assert_eq!(params.timeout_for(3), Duration::from_secs(10));

        let params = params.with_reevaluation_timeout_factor(f64::NAN);
        assert_eq!(params.timeout_for(1), Duration::from_secs(10));
    }

    #[test]
    fn test_timeout_saturates() {
        let params = VerificationParams::default().with_reevaluation_timeout_factor(1e300);
        assert_eq!(params.timeout_for(10), Duration::MAX);
    }
}
