//! Verifier pool from TOML (`[[verifiers]]` array)
//!
//! ```toml
//! [[verifiers]]
//! id = "placeholders"
//! kind = "heuristic"
//! checks = ["blank", "placeholders"]
//! markers = ["FIXME"]
//!
//! [[verifiers]]
//! id = "clippy"
//! kind = "command"
//! command = "./scripts/check.sh"
//! args = ["--strict"]
//! ```

use crate::verifiers::HeuristicCheck;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use supervisor_domain::{ConfigIssue, ConfigIssueCode};

/// Kind of verifier an entry builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierKind {
    Heuristic,
    Command,
}

impl std::str::FromStr for VerifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" | "builtin" => Ok(VerifierKind::Heuristic),
            "command" | "cmd" | "external" => Ok(VerifierKind::Command),
            other => Err(format!("Unknown verifier kind: {}", other)),
        }
    }
}

/// One `[[verifiers]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVerifierConfig {
    pub id: String,
    /// "heuristic" or "command"
    pub kind: String,
    /// Program to run (command verifiers)
    pub command: Option<String>,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Checks to run (heuristic verifiers); empty means all
    pub checks: Vec<String>,
    /// Extra placeholder markers (heuristic verifiers)
    pub markers: Vec<String>,
    /// Share of task keywords the artifact must mention (heuristic verifiers)
    pub min_coverage: Option<f64>,
}

impl Default for FileVerifierConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: "heuristic".to_string(),
            command: None,
            args: Vec::new(),
            working_dir: None,
            checks: Vec::new(),
            markers: Vec::new(),
            min_coverage: None,
        }
    }
}

impl FileVerifierConfig {
    pub fn heuristic(id: &str, checks: &[HeuristicCheck]) -> Self {
        Self {
            id: id.to_string(),
            checks: checks.iter().map(|c| c.as_str().to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn command(id: &str, command: &str, args: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            kind: "command".to_string(),
            command: Some(command.to_string()),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Parse the kind; an unknown kind is an error since the entry cannot be built.
    pub fn parse_kind(&self) -> (Option<VerifierKind>, Vec<ConfigIssue>) {
        match self.kind.parse::<VerifierKind>() {
            Ok(kind) => (Some(kind), vec![]),
            Err(_) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: format!("verifiers.{}.kind", self.id),
                        value: self.kind.clone(),
                        valid_values: vec!["heuristic".to_string(), "command".to_string()],
                    },
                    format!(
                        "verifier '{}': unknown kind '{}' (expected 'heuristic' or 'command')",
                        self.id, self.kind
                    ),
                );
                (None, vec![issue])
            }
        }
    }

    /// Parse the check names, skipping unknown ones.
    pub fn parse_checks(&self) -> (Vec<HeuristicCheck>, Vec<ConfigIssue>) {
        if self.checks.is_empty() {
            return (HeuristicCheck::ALL.to_vec(), vec![]);
        }

        let mut checks = Vec::new();
        let mut issues = Vec::new();
        for name in &self.checks {
            match name.parse::<HeuristicCheck>() {
                Ok(check) if !checks.contains(&check) => checks.push(check),
                Ok(_) => {}
                Err(_) => issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: format!("verifiers.{}.checks", self.id),
                        value: name.clone(),
                        valid_values: HeuristicCheck::ALL
                            .iter()
                            .map(|c| c.as_str().to_string())
                            .collect(),
                    },
                    format!("verifier '{}': unknown check '{}' ignored", self.id, name),
                )),
            }
        }
        (checks, issues)
    }

    /// Everything wrong with this entry on its own.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (kind, mut issues) = self.parse_kind();
        match kind {
            Some(VerifierKind::Heuristic) => issues.extend(self.parse_checks().1),
            Some(VerifierKind::Command) => {
                if self.command.as_deref().is_none_or(|c| c.trim().is_empty()) {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::MissingCommand {
                            component: format!("verifier '{}'", self.id),
                        },
                        format!("verifier '{}' has kind 'command' but no command", self.id),
                    ));
                }
            }
            None => {}
        }
        issues
    }
}

/// Pool used when no `[[verifiers]]` are configured: three heuristic
/// verifiers looking at different aspects of the artifact.
pub fn default_verifiers() -> Vec<FileVerifierConfig> {
    vec![
        FileVerifierConfig::heuristic(
            "completeness",
            &[HeuristicCheck::Blank, HeuristicCheck::Placeholders],
        ),
        FileVerifierConfig::heuristic(
            "structure",
            &[HeuristicCheck::Blank, HeuristicCheck::Delimiters],
        ),
        FileVerifierConfig::heuristic(
            "relevance",
            &[HeuristicCheck::Blank, HeuristicCheck::TaskCoverage],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_verifier_array() {
        let toml_str = r#"
[[verifiers]]
id = "todo"
checks = ["placeholders", "coverage"]
min_coverage = 0.25

[[verifiers]]
id = "tests"
kind = "command"
command = "cargo"
args = ["test", "--quiet"]
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.verifiers.len(), 2);

        let todo = &config.verifiers[0];
        assert_eq!(todo.parse_kind().0, Some(VerifierKind::Heuristic));
        assert_eq!(
            todo.parse_checks().0,
            vec![HeuristicCheck::Placeholders, HeuristicCheck::TaskCoverage]
        );
        assert_eq!(todo.min_coverage, Some(0.25));

        let tests = &config.verifiers[1];
        assert_eq!(tests.parse_kind().0, Some(VerifierKind::Command));
        assert_eq!(tests.args, vec!["test", "--quiet"]);
        assert!(tests.validate().is_empty());
    }

    #[test]
    fn test_command_without_command_is_error() {
        let entry = FileVerifierConfig {
            id: "broken".to_string(),
            kind: "command".to_string(),
            ..Default::default()
        };
        let issues = entry.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert!(matches!(
            issues[0].code,
            ConfigIssueCode::MissingCommand { .. }
        ));
    }

    #[test]
    fn test_unknown_kind_and_checks() {
        let entry = FileVerifierConfig {
            id: "x".to_string(),
            kind: "oracle".to_string(),
            ..Default::default()
        };
        let (kind, issues) = entry.parse_kind();
        assert!(kind.is_none());
        assert!(issues[0].is_error());

        let entry = FileVerifierConfig {
            id: "y".to_string(),
            checks: vec!["blank".to_string(), "spelling".to_string(), "blank".to_string()],
            ..Default::default()
        };
        let (checks, issues) = entry.parse_checks();
        assert_eq!(checks, vec![HeuristicCheck::Blank]);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_default_pool_is_valid() {
        let pool = default_verifiers();
        assert_eq!(pool.len(), 3);
        assert!(pool.iter().all(|v| v.validate().is_empty()));
    }
}
