//! Session limits from TOML (`[verification]` section)
//!
//! ```toml
//! [verification]
//! timeout_secs = 30                 # per-verifier timeout
//! max_attempts = 3                  # artifacts produced, including the first
//! max_reevaluations = 1             # extra rounds after an inconclusive one
//! reevaluation_timeout_factor = 2.0
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVerificationConfig {
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub max_reevaluations: u32,
    pub reevaluation_timeout_factor: f64,
}

impl Default for FileVerificationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 3,
            max_reevaluations: 1,
            reevaluation_timeout_factor: 2.0,
        }
    }
}

impl FileVerificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let toml_str = r#"
[verification]
timeout_secs = 5
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.verification.timeout(), Duration::from_secs(5));
        assert_eq!(config.verification.max_attempts, 3);
        assert_eq!(config.verification.reevaluation_timeout_factor, 2.0);
    }
}
