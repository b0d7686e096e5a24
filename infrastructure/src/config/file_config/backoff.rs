//! Regeneration backoff from TOML (`[backoff]` section)
//!
//! ```toml
//! [backoff]
//! strategy = "exponential"   # "none", "fixed" or "exponential"
//! delay_ms = 1000            # fixed only
//! initial_ms = 500           # exponential only
//! factor = 2.0
//! max_ms = 10000
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use supervisor_domain::{BackoffSchedule, ConfigIssue, ConfigIssueCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackoffConfig {
    pub strategy: String,
    pub delay_ms: u64,
    pub initial_ms: u64,
    pub factor: f64,
    pub max_ms: u64,
}

impl Default for FileBackoffConfig {
    fn default() -> Self {
        Self {
            strategy: "exponential".to_string(),
            delay_ms: 1_000,
            initial_ms: 500,
            factor: 2.0,
            max_ms: 10_000,
        }
    }
}

impl FileBackoffConfig {
    pub fn to_schedule(&self) -> (BackoffSchedule, Vec<ConfigIssue>) {
        match self.strategy.trim().to_lowercase().as_str() {
            "none" | "off" => (BackoffSchedule::None, vec![]),
            "fixed" => (
                BackoffSchedule::fixed(Duration::from_millis(self.delay_ms)),
                vec![],
            ),
            "exponential" | "exp" => (self.exponential(), vec![]),
            _ => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "backoff.strategy".to_string(),
                        value: self.strategy.clone(),
                        valid_values: vec![
                            "none".to_string(),
                            "fixed".to_string(),
                            "exponential".to_string(),
                        ],
                    },
                    format!(
                        "backoff.strategy: unknown value '{}', falling back to 'exponential'",
                        self.strategy
                    ),
                );
                (self.exponential(), vec![issue])
            }
        }
    }

    fn exponential(&self) -> BackoffSchedule {
        BackoffSchedule::exponential(
            Duration::from_millis(self.initial_ms),
            self.factor,
            Duration::from_millis(self.max_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_strategy() {
        let toml_str = r#"
[backoff]
strategy = "fixed"
delay_ms = 250
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let (schedule, issues) = config.backoff.to_schedule();
        assert!(issues.is_empty());
        assert_eq!(schedule, BackoffSchedule::Fixed { delay_ms: 250 });
    }

    #[test]
    fn test_unknown_strategy_falls_back() {
        let config = FileBackoffConfig {
            strategy: "linear".to_string(),
            ..Default::default()
        };
        let (schedule, issues) = config.to_schedule();
        assert_eq!(schedule, BackoffSchedule::default());
        assert_eq!(issues.len(), 1);
    }
}
