//! Command verifier
//!
//! Runs an external checker (linter, test runner, review script) with the
//! rendered artifact on stdin.
//!
//! # Protocol
//!
//! - Environment: `SUPERVISOR_TASK`, `SUPERVISOR_ATTEMPT`,
//!   `SUPERVISOR_ARTIFACT_KIND`, `SUPERVISOR_ARTIFACT_ID`.
//! - Exit code `0` approves; any other exit code rejects.
//! - Stdout lines of the form `severity:category:description` become
//!   issues. A rejection without such lines becomes one issue built from
//!   stderr (or stdout when stderr is empty).
//! - Termination by signal is an execution failure, not a rejection.

use crate::process::{CommandSpec, ProcessOutput, run_with_input};
use async_trait::async_trait;
use std::path::PathBuf;
use supervisor_application::{CheckReport, Verifier, VerifierError};
use supervisor_domain::core::string::truncate;
use supervisor_domain::{Artifact, Issue, IssueCategory, IssueSeverity, VerifierId};
use tracing::{debug, warn};

/// Longest fallback issue description taken from raw output
const MAX_FALLBACK_LEN: usize = 2000;

/// Verifier backed by an external program
pub struct CommandVerifier {
    id: VerifierId,
    spec: CommandSpec,
    resolved: Option<PathBuf>,
}

impl CommandVerifier {
    pub fn new(id: impl Into<VerifierId>, program: impl Into<String>, args: Vec<String>) -> Self {
        let spec = CommandSpec::new(program).with_args(args);
        let resolved = spec.resolve();
        let id = id.into();
        if resolved.is_none() {
            warn!("Verifier {}: command '{}' not found", id, spec.program);
        }
        Self { id, spec, resolved }
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.spec = self.spec.with_working_dir(dir);
        self
    }

    /// Whether the program was found when the verifier was built
    pub fn is_available(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn command(&self) -> String {
        self.spec.display()
    }
}

#[async_trait]
impl Verifier for CommandVerifier {
    fn id(&self) -> &VerifierId {
        &self.id
    }

    async fn check(&self, artifact: &Artifact) -> Result<CheckReport, VerifierError> {
        let Some(program) = &self.resolved else {
            return Err(VerifierError::Unavailable(format!(
                "command '{}' not found",
                self.spec.program
            )));
        };

        let spec = CommandSpec {
            program: program.to_string_lossy().into_owned(),
            ..self.spec.clone()
        }
        .with_env("SUPERVISOR_TASK", artifact.task.as_str())
        .with_env("SUPERVISOR_ATTEMPT", artifact.attempt.to_string())
        .with_env("SUPERVISOR_ARTIFACT_KIND", artifact.content.kind())
        .with_env("SUPERVISOR_ARTIFACT_ID", artifact.id.as_str());

        let output = run_with_input(&spec, &artifact.content.render()).await?;
        debug!(
            "Verifier {} exited with {:?} in {:?}",
            self.id, output.code, output.elapsed
        );
        interpret(output)
    }
}

/// Map a finished process to a report.
fn interpret(output: ProcessOutput) -> Result<CheckReport, VerifierError> {
    let Some(code) = output.code else {
        return Err(VerifierError::ExecutionFailed(
            "checker terminated by signal".to_string(),
        ));
    };

    let stdout = output.stdout_lossy();
    let stderr = output.stderr_lossy();
    let issues: Vec<Issue> = stdout.lines().filter_map(parse_issue_line).collect();

    if code == 0 {
        return Ok(CheckReport {
            approved: true,
            issues,
            confidence: 1.0,
        });
    }

    if !issues.is_empty() {
        return Ok(CheckReport::reject(issues));
    }

    let raw = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    let description = if raw.is_empty() {
        format!("checker exited with code {}", code)
    } else {
        truncate(raw, MAX_FALLBACK_LEN)
    };
    Ok(CheckReport::reject(vec![Issue::major(
        IssueCategory::Other,
        description,
    )]))
}

/// Parse `severity:category:description`; other lines are ignored.
pub fn parse_issue_line(line: &str) -> Option<Issue> {
    let mut parts = line.trim().splitn(3, ':');
    let severity: IssueSeverity = parts.next()?.trim().parse().ok()?;
    let category: IssueCategory = parts.next()?.trim().parse().ok()?;
    let description = parts.next()?.trim();
    if description.is_empty() {
        return None;
    }
    Some(Issue::new(category, severity, description))
}
