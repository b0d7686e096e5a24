//! Artifact producer from TOML (`[producer]` section)
//!
//! Without a command, the engine runs in review-only mode: the artifact
//! passed on the command line is verified once and cannot be regenerated.

use crate::producers::{DEFAULT_MAX_ARTIFACT_BYTES, ProducedKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use supervisor_domain::{ConfigIssue, ConfigIssueCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProducerConfig {
    /// Generator program; receives the task or correction prompt on stdin
    pub command: Option<String>,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    /// How stdout is interpreted: "text" or "diff"
    pub kind: String,
    /// Larger output fails the attempt instead of being cut
    pub max_output_bytes: usize,
}

impl Default for FileProducerConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            working_dir: None,
            timeout_secs: 300,
            kind: "text".to_string(),
            max_output_bytes: DEFAULT_MAX_ARTIFACT_BYTES,
        }
    }
}

impl FileProducerConfig {
    pub fn is_configured(&self) -> bool {
        self.command.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn parse_kind(&self) -> (ProducedKind, Vec<ConfigIssue>) {
        match self.kind.parse::<ProducedKind>() {
            Ok(kind) => (kind, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "producer.kind".to_string(),
                        value: self.kind.clone(),
                        valid_values: vec!["text".to_string(), "diff".to_string()],
                    },
                    format!(
                        "producer.kind: unknown value '{}', falling back to 'text'",
                        self.kind
                    ),
                );
                (ProducedKind::Text, vec![issue])
            }
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_kind().1;
        if !self.is_configured() && !self.args.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingCommand {
                    component: "producer".to_string(),
                },
                "producer.args is set but producer.command is not; args are ignored",
            ));
        }
        issues
    }
}
