//! Verifier adapters and the factory that builds a pool from configuration

mod command;
mod heuristic;

pub use command::{CommandVerifier, parse_issue_line};
pub use heuristic::{HeuristicCheck, HeuristicVerifier};

use crate::config::{FileVerifierConfig, VerifierKind};
use std::sync::Arc;
use supervisor_application::{Verifier, VerifierPool};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerifierBuildError {
    #[error("verifier '{id}': unknown kind '{kind}'")]
    UnknownKind { id: String, kind: String },

    #[error("verifier '{0}': kind 'command' requires a command")]
    MissingCommand(String),
}

/// Build one verifier from its configuration entry.
pub fn build_verifier(config: &FileVerifierConfig) -> Result<Arc<dyn Verifier>, VerifierBuildError> {
    let Some(kind) = config.parse_kind().0 else {
        return Err(VerifierBuildError::UnknownKind {
            id: config.id.clone(),
            kind: config.kind.clone(),
        });
    };

    match kind {
        VerifierKind::Heuristic => {
            let (checks, issues) = config.parse_checks();
            for issue in issues {
                warn!("{}", issue.message);
            }
            let mut verifier = HeuristicVerifier::new(config.id.as_str())
                .with_checks(checks)
                .with_extra_markers(&config.markers);
            if let Some(min) = config.min_coverage {
                verifier = verifier.with_min_coverage(min);
            }
            Ok(Arc::new(verifier))
        }
        VerifierKind::Command => {
            let Some(command) = config.command.as_deref().filter(|c| !c.trim().is_empty()) else {
                return Err(VerifierBuildError::MissingCommand(config.id.clone()));
            };
            let verifier = CommandVerifier::new(config.id.as_str(), command, config.args.clone())
                .with_working_dir(config.working_dir.clone());
            Ok(Arc::new(verifier))
        }
    }
}

/// Build the whole pool, in configuration order.
pub fn build_pool(configs: &[FileVerifierConfig]) -> Result<VerifierPool, VerifierBuildError> {
    let verifiers = configs
        .iter()
        .map(build_verifier)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Built verifier pool with {} verifier(s)", verifiers.len());
    Ok(VerifierPool::new(verifiers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_verifiers;

    #[test]
    fn test_build_default_pool() {
        let pool = build_pool(&default_verifiers()).unwrap();
        assert_eq!(pool.len(), 3);
        let ids: Vec<String> = pool.ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["completeness", "structure", "relevance"]);
    }

    #[test]
    fn test_build_errors() {
        let unknown = FileVerifierConfig {
            id: "x".to_string(),
            kind: "oracle".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            build_verifier(&unknown),
            Err(VerifierBuildError::UnknownKind { .. })
        ));

        let no_command = FileVerifierConfig {
            id: "y".to_string(),
            kind: "command".to_string(),
            command: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_verifier(&no_command).err(),
            Some(VerifierBuildError::MissingCommand("y".to_string()))
        );
    }

    #[test]
    fn test_build_command_verifier() {
        let config = FileVerifierConfig::command("echo", "echo", &["ok"]);
        let verifier = build_verifier(&config).unwrap();
        assert_eq!(verifier.id().as_str(), "echo");
    }
}
