//! Command-backed artifact producer
//!
//! Spawns a generator program for each attempt. The first attempt receives
//! the task on stdin with `SUPERVISOR_MODE=generate`; later attempts receive
//! the rendered correction prompt with `SUPERVISOR_MODE=regenerate`.
//! Whatever the program prints on stdout is the new artifact, verbatim:
//! output that is not UTF-8 or exceeds the size limit fails the attempt.

use crate::process::{CommandSpec, run_with_input};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use supervisor_application::{ArtifactProducer, ProducerError};
use supervisor_domain::core::string::truncate;
use supervisor_domain::{Artifact, ArtifactContent, CorrectionRequest};
use tracing::{debug, info, warn};

/// Default limit on a produced artifact (1 MB)
pub const DEFAULT_MAX_ARTIFACT_BYTES: usize = 1024 * 1024;

/// How the producer's stdout is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProducedKind {
    #[default]
    Text,
    Diff,
}

impl std::str::FromStr for ProducedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "code" => Ok(ProducedKind::Text),
            "diff" | "patch" => Ok(ProducedKind::Diff),
            other => Err(format!("Unknown artifact kind: {}", other)),
        }
    }
}

pub struct CommandArtifactProducer {
    name: String,
    spec: CommandSpec,
    timeout: Duration,
    kind: ProducedKind,
    max_bytes: usize,
}

impl CommandArtifactProducer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        let spec = CommandSpec::new(program).with_args(args);
        Self {
            name: spec.display(),
            spec,
            timeout,
            kind: ProducedKind::default(),
            max_bytes: DEFAULT_MAX_ARTIFACT_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_kind(mut self, kind: ProducedKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.spec = self.spec.with_working_dir(dir);
        self
    }

    async fn run(&self, spec: CommandSpec, input: &str) -> Result<ArtifactContent, ProducerError> {
        let output = match tokio::time::timeout(self.timeout, run_with_input(&spec, input)).await {
            Err(_) => return Err(ProducerError::Timeout),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(ProducerError::Unavailable(format!(
                    "command '{}' not found",
                    self.spec.program
                )));
            }
            Ok(Err(e)) => return Err(ProducerError::Failed(e.to_string())),
            Ok(Ok(output)) => output,
        };

        if !output.success() {
            let stderr = output.stderr_lossy();
            let detail = stderr.trim();
            return Err(ProducerError::Failed(match output.code {
                Some(code) if detail.is_empty() => format!("exited with code {}", code),
                Some(code) => format!("exited with code {}: {}", code, truncate(detail, 500)),
                None => "terminated by signal".to_string(),
            }));
        }

        let elapsed = output.elapsed;
        let text = output.into_stdout_text(self.max_bytes).map_err(|e| {
            warn!("{} produced unusable output: {}", self.name, e);
            ProducerError::Failed(format!("unusable output: {}", e))
        })?;

        if text.trim().is_empty() {
            return Err(ProducerError::Empty);
        }

        debug!("{} produced {} bytes in {:?}", self.name, text.len(), elapsed);
        Ok(match self.kind {
            ProducedKind::Text => ArtifactContent::text(text),
            ProducedKind::Diff => ArtifactContent::diff(text),
        })
    }
}

#[async_trait]
impl ArtifactProducer for CommandArtifactProducer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, task: &str) -> Result<ArtifactContent, ProducerError> {
        info!("Generating initial artifact with {}", self.name);
        let spec = self
            .spec
            .clone()
            .with_env("SUPERVISOR_MODE", "generate")
            .with_env("SUPERVISOR_TASK", task)
            .with_env("SUPERVISOR_ATTEMPT", "1");
        self.run(spec, task).await
    }

    async fn regenerate(
        &self,
        task: &str,
        previous: &Artifact,
        correction: &CorrectionRequest,
    ) -> Result<ArtifactContent, ProducerError> {
        info!(
            "Regenerating artifact {} ({} issue(s) to fix)",
            previous.id,
            correction.issues.len()
        );
        let spec = self
            .spec
            .clone()
            .with_env("SUPERVISOR_MODE", "regenerate")
            .with_env("SUPERVISOR_TASK", task)
            .with_env("SUPERVISOR_ATTEMPT", (previous.attempt + 1).to_string())
            .with_env("SUPERVISOR_PREVIOUS_ID", previous.id.as_str());
        self.run(spec, &correction.render_prompt()).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use supervisor_domain::{
        Decision, Issue, IssueCategory, QuorumPolicy, RoundResult, Verdict, aggregate,
    };

    fn sh(script: &str) -> CommandArtifactProducer {
        CommandArtifactProducer::new(
            "sh",
            vec!["-c".to_string(), script.to_string()],
            Duration::from_secs(5),
        )
    }

    fn correction(previous: &Artifact) -> CorrectionRequest {
        let round = RoundResult::new(
            vec![Verdict::reject(
                "lint",
                vec![Issue::major(IssueCategory::Logic, "off by one")],
            )],
            Duration::from_millis(3),
        );
        let decision: Decision = aggregate(&round, &QuorumPolicy::default(), 1, 1);
        CorrectionRequest::from_decision(previous, &decision)
    }

    #[tokio::test]
    async fn test_generate_reads_task_from_stdin() {
        let producer = sh(r#"echo "mode=$SUPERVISOR_MODE"; cat"#);
        let content = producer.generate("sort a list").await.unwrap();
        assert_eq!(content.render(), "mode=generate\nsort a list");
    }

    #[tokio::test]
    async fn test_regenerate_receives_correction_prompt() {
        let producer = sh(r#"echo "$SUPERVISOR_MODE $SUPERVISOR_ATTEMPT"; grep -c "off by one""#)
            .with_kind(ProducedKind::Diff);
        let previous = Artifact::new("sort a list", ArtifactContent::text("v1"));
        let content = producer
            .regenerate("sort a list", &previous, &correction(&previous))
            .await
            .unwrap();
        assert_eq!(content.kind(), "diff");
        assert_eq!(content.render(), "regenerate 2\n1\n");
    }

    #[tokio::test]
    async fn test_failure_modes() {
        assert!(matches!(
            sh("echo broken >&2; exit 4").generate("t").await,
            Err(ProducerError::Failed(msg)) if msg.contains("code 4") && msg.contains("broken")
        ));
        assert_eq!(sh("printf '  \n'").generate("t").await, Err(ProducerError::Empty));

        let slow = CommandArtifactProducer::new(
            "sh",
            vec!["-c".to_string(), "sleep 5".to_string()],
            Duration::from_millis(50),
        );
        assert_eq!(slow.generate("t").await, Err(ProducerError::Timeout));

        let missing =
            CommandArtifactProducer::new("no-such-generator-7731", vec![], Duration::from_secs(1));
        assert!(matches!(
            missing.generate("t").await,
            Err(ProducerError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_output_fails_instead_of_truncating() {
        let producer = sh("head -c 2000 /dev/zero | tr '\\0' a").with_max_bytes(1024);
        assert!(matches!(
            producer.generate("t").await,
            Err(ProducerError::Failed(msg)) if msg.contains("2000 bytes")
        ));

        let roomy = sh("head -c 2000 /dev/zero | tr '\\0' a").with_max_bytes(4096);
        assert_eq!(roomy.generate("t").await.unwrap().render().len(), 2000);
    }

    #[tokio::test]
    async fn test_non_utf8_output_fails() {
        let producer = sh(r"printf 'ok \377\376'");
        assert!(matches!(
            producer.generate("t").await,
            Err(ProducerError::Failed(msg)) if msg.contains("UTF-8")
        ));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("patch".parse::<ProducedKind>(), Ok(ProducedKind::Diff));
        assert!("pdf".parse::<ProducedKind>().is_err());
    }
}
