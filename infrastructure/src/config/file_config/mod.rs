//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain and application
//! types through `parse_*` / `to_*` methods that report what they had to
//! fall back on.

mod backoff;
mod logging;
mod output;
mod producer;
mod quorum;
mod verification;
mod verifiers;

pub use backoff::FileBackoffConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use producer::FileProducerConfig;
pub use quorum::FileQuorumConfig;
pub use verification::FileVerificationConfig;
pub use verifiers::{FileVerifierConfig, VerifierKind, default_verifiers};

use serde::{Deserialize, Serialize};
use supervisor_application::VerificationParams;
use supervisor_domain::{ConfigIssue, PoolSetup};
use thiserror::Error;

/// Configuration that cannot be used to start a session
#[derive(Error, Debug)]
pub enum ConfigValidationError {
    #[error("configuration has {} error(s): {}", .0.len(), summarize(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn summarize(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Timeouts, attempts and re-evaluation budget
    pub verification: FileVerificationConfig,
    /// Consensus rule
    pub quorum: FileQuorumConfig,
    /// Delay between regenerations
    pub backoff: FileBackoffConfig,
    /// Verifier pool
    pub verifiers: Vec<FileVerifierConfig>,
    /// Artifact generator
    pub producer: FileProducerConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            verification: FileVerificationConfig::default(),
            quorum: FileQuorumConfig::default(),
            backoff: FileBackoffConfig::default(),
            verifiers: default_verifiers(),
            producer: FileProducerConfig::default(),
            logging: FileLoggingConfig::default(),
            output: FileOutputConfig::default(),
        }
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Enum parse failures (quorum rule, backoff strategy, producer kind)
    /// 2. Each verifier entry on its own (kind, checks, command)
    /// 3. The pool as a whole against the quorum policy and timeouts
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Enum parse validation
        let (policy, rule_issues) = self.quorum.to_policy();
        issues.extend(rule_issues);
        issues.extend(self.backoff.to_schedule().1);
        issues.extend(self.producer.validate());

        // 2. Per-verifier validation
        for verifier in &self.verifiers {
            issues.extend(verifier.validate());
        }

        // 3. Pool-level validation
        let setup = PoolSetup {
            verifier_ids: self.verifiers.iter().map(|v| v.id.clone()).collect(),
            policy,
            per_verifier_timeout_ms: self.verification.timeout_secs.saturating_mul(1000),
            max_attempts: self.verification.max_attempts,
        };
        issues.extend(setup.validate());

        issues
    }

    /// Validate and fail on any error-severity issue; warnings are returned.
    pub fn validated(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(|i| i.is_error());
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError::Invalid(errors))
        }
    }

    /// Session parameters, with the same fallbacks `validate` reports.
    pub fn to_params(&self) -> VerificationParams {
        VerificationParams::default()
            .with_per_verifier_timeout(self.verification.timeout())
            .with_max_attempts(self.verification.max_attempts.max(1))
            .with_max_reevaluations(self.verification.max_reevaluations)
            .with_reevaluation_timeout_factor(self.verification.reevaluation_timeout_factor)
            .with_policy(self.quorum.to_policy().0)
            .with_backoff(self.backoff.to_schedule().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use supervisor_domain::{ConfigIssueCode, OutputFormat, QuorumRule};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[verification]
timeout_secs = 10
max_attempts = 5

[quorum]
rule = "unanimous"
min_completed = 2

[backoff]
strategy = "none"

[[verifiers]]
id = "a"

[[verifiers]]
id = "b"
checks = ["delimiters"]

[producer]
command = "gen"

[output]
format = "json"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.verifiers.len(), 2);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert!(config.producer.is_configured());

        let params = config.to_params();
        assert_eq!(params.per_verifier_timeout, Duration::from_secs(10));
        assert_eq!(params.max_attempts, 5);
        assert_eq!(params.policy.rule, QuorumRule::Unanimous);
        assert_eq!(params.backoff, supervisor_domain::BackoffSchedule::None);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[quorum]
rule = "majority"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quorum.parse_rule().0, QuorumRule::Majority);
        // Defaults should apply
        assert_eq!(config.verifiers.len(), 3);
        assert!(!config.producer.is_configured());
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_default_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert!(config.validated().unwrap().is_empty());
    }

    #[test]
    fn test_validate_collects_pool_issues() {
        let toml_str = r#"
[verification]
timeout_secs = 0

[quorum]
rule = "sometimes"
min_completed = 4

[[verifiers]]
id = "only"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        let codes: Vec<_> = issues.iter().map(|i| &i.code).collect();

        assert!(codes.iter().any(|c| matches!(c, ConfigIssueCode::InvalidEnumValue { field, .. } if field == "quorum.rule")));
        assert!(codes.contains(&&ConfigIssueCode::FewVerifiers));
        assert!(codes.contains(&&ConfigIssueCode::MinCompletedExceedsPool));
        assert!(codes.contains(&&ConfigIssueCode::ZeroTimeout));

        match config.validated() {
            Err(ConfigValidationError::Invalid(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].code, ConfigIssueCode::ZeroTimeout);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_verifier_list_is_error() {
        let config = FileConfig {
            verifiers: vec![],
            ..Default::default()
        };
        let err = config.validated().unwrap_err();
        assert!(err.to_string().contains("no verifiers configured"));
    }
}
