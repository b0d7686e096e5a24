//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use supervisor_domain::OutputFormat;

/// Output format for the session outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// Human-readable report
    Text,
    /// Full outcome as JSON
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => OutputFormat::Text,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for supervisor-quorum
#[derive(Parser, Debug)]
#[command(name = "supervisor-quorum")]
#[command(author, version, about = "Multi-verifier consensus check for generated artifacts")]
#[command(long_about = r#"
Supervisor Quorum sends a generated artifact (code, a diff, a document) to a
pool of independent verifiers, aggregates their verdicts under a quorum rule,
and asks the producer for a corrected artifact when the quorum rejects it.

Each session ends in exactly one outcome:
  accepted           exit code 0
  exhausted retries  exit code 1
  fatal error        exit code 2

Configuration files are loaded from (in priority order):
1. --config <path>          Explicit config file
2. ./supervisor.toml        Project-level config
3. ~/.config/supervisor-quorum/config.toml   Global config

Example:
  supervisor-quorum --artifact patch.diff --task "Fix the off-by-one in paginate()"
  supervisor-quorum --task "Write a CSV parser" --rule unanimous --max-attempts 5
  git diff | supervisor-quorum --artifact - --task "Add retries" --output json
"#)]
pub struct Cli {
    /// Artifact to verify ("-" reads stdin). Without it, the configured producer generates one
    #[arg(short, long, value_name = "PATH")]
    pub artifact: Option<PathBuf>,

    /// Natural-language task the artifact should fulfil
    #[arg(short, long, value_name = "TEXT")]
    pub task: Option<String>,

    /// Treat the artifact as a diff (default: detected from .diff/.patch extension)
    #[arg(long)]
    pub diff: bool,

    /// Quorum rule: strict_majority, majority, unanimous, atleast:N, N%
    #[arg(short, long, value_name = "RULE")]
    pub rule: Option<String>,

    /// Per-verifier timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum artifacts per session, the first one included
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormatArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Append session events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub decision_log: Option<PathBuf>,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Whether the artifact should be read as a diff
    pub fn artifact_is_diff(&self) -> bool {
        self.diff
            || self
                .artifact
                .as_ref()
                .and_then(|p| p.extension())
                .is_some_and(|ext| ext == "diff" || ext == "patch")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "supervisor-quorum",
            "--artifact",
            "fix.patch",
            "-t",
            "fix paging",
            "--rule",
            "unanimous",
            "--max-attempts",
            "1",
            "-o",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.task.as_deref(), Some("fix paging"));
        assert_eq!(cli.rule.as_deref(), Some("unanimous"));
        assert_eq!(cli.max_attempts, Some(1));
        assert_eq!(cli.output, Some(OutputFormatArg::Json));
        assert_eq!(cli.verbose, 2);
        assert!(cli.artifact_is_diff());
    }

    #[test]
    fn test_plain_artifact_is_text() {
        let cli = Cli::try_parse_from(["supervisor-quorum", "-a", "main.rs"]).unwrap();
        assert!(!cli.artifact_is_diff());
        assert!(cli.output.is_none());
    }
}
