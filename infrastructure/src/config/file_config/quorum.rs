//! Quorum configuration from TOML (`[quorum]` section)
//!
//! ```toml
//! [quorum]
//! rule = "strict_majority"   # or "majority", "unanimous", "atleast:2", "75%"
//! min_completed = 2          # verifiers that must finish for a decision
//! ```

use serde::{Deserialize, Serialize};
use supervisor_domain::{ConfigIssue, ConfigIssueCode, QuorumPolicy, QuorumRule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQuorumConfig {
    /// Consensus rule: "strict_majority", "majority", "unanimous", "atleast:N", "N%"
    pub rule: String,
    /// Minimum number of completed verifiers for a decisive round
    pub min_completed: usize,
}

impl Default for FileQuorumConfig {
    fn default() -> Self {
        let policy = QuorumPolicy::default();
        Self {
            rule: "strict_majority".to_string(),
            min_completed: policy.min_completed,
        }
    }
}

impl FileQuorumConfig {
    /// Parse the rule string, falling back to strict majority.
    pub fn parse_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        match self.rule.parse::<QuorumRule>() {
            Ok(rule) => (rule, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "quorum.rule".to_string(),
                        value: self.rule.clone(),
                        valid_values: vec![
                            "strict_majority".to_string(),
                            "majority".to_string(),
                            "unanimous".to_string(),
                            "atleast:N".to_string(),
                            "N%".to_string(),
                        ],
                    },
                    format!(
                        "quorum.rule: unknown value '{}', falling back to 'strict_majority'",
                        self.rule
                    ),
                );
                (QuorumRule::StrictMajority, vec![issue])
            }
        }
    }

    pub fn to_policy(&self) -> (QuorumPolicy, Vec<ConfigIssue>) {
        let (rule, issues) = self.parse_rule();
        (QuorumPolicy::new(rule, self.min_completed), issues)
    }
}
