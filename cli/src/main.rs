//! CLI entrypoint for Supervisor Quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{IsTerminal, Read};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use supervisor_application::{
    ArtifactProducer, NoProgress, RunVerificationUseCase, VerificationProgressNotifier,
    VerificationRequest,
};
use supervisor_domain::{Artifact, ArtifactContent, OutputFormat, SessionOutcome};
use supervisor_infrastructure::{
    CommandArtifactProducer, ConfigLoader, FileConfig, JsonlVerificationLogger,
    StaticArtifactProducer, build_pool,
};
use supervisor_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const EXIT_EXHAUSTED: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    apply_overrides(&mut config, &cli);

    let log_file = cli.log_file.clone().or_else(|| config.logging.log_file.clone());
    let _guard = init_logging(cli.verbose, log_file.as_deref())?;

    info!("Starting Supervisor Quorum");

    match config.validated() {
        Ok(warnings) => {
            for issue in warnings {
                warn!("{}", issue.message);
                if !cli.quiet {
                    eprintln!("warning: {}", issue.message);
                }
            }
        }
        Err(e) => return Err(e.into()),
    }

    let task = match cli.task.as_deref().map(str::trim) {
        Some(task) if !task.is_empty() => task.to_string(),
        _ => bail!("--task is required: verifiers judge the artifact against it"),
    };

    // === Dependency Injection ===
    let pool = Arc::new(build_pool(&config.verifiers)?);
    let mut params = config.to_params();

    let artifact = match &cli.artifact {
        Some(path) => Some(read_artifact(path, cli.artifact_is_diff())?),
        None => None,
    };

    let producer: Arc<dyn ArtifactProducer> = if config.producer.is_configured() {
        let (kind, _) = config.producer.parse_kind();
        let command = config.producer.command.clone().unwrap_or_default();
        let producer = CommandArtifactProducer::new(
            command,
            config.producer.args.clone(),
            config.producer.timeout(),
        )
        .with_kind(kind)
        .with_working_dir(config.producer.working_dir.clone())
        .with_max_bytes(config.producer.max_output_bytes);
        Arc::new(producer)
    } else {
        let Some(content) = artifact.clone() else {
            bail!("nothing to verify: pass --artifact or configure [producer] command");
        };
        // Review only: a rejection cannot be corrected.
        params = params.with_max_attempts(1);
        Arc::new(StaticArtifactProducer::new(content))
    };

    let request = match artifact {
        Some(content) => VerificationRequest::Artifact(Artifact::new(task, content)),
        None => VerificationRequest::Task(task),
    };

    let mut use_case = RunVerificationUseCase::new(pool, producer, params);
    let decision_log = cli
        .decision_log
        .clone()
        .or_else(|| config.logging.decision_log.clone());
    if let Some(path) = decision_log {
        match JsonlVerificationLogger::new(&path) {
            Some(logger) => use_case = use_case.with_logger(Arc::new(logger)),
            None => warn!("Decision log disabled: cannot open {}", path.display()),
        }
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling session");
                cancel.cancel();
            }
        }
    });

    let progress: Box<dyn VerificationProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if config.output.show_progress && std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let outcome = use_case.execute(request, progress.as_ref(), cancel).await;

    ConsoleFormatter::set_color(config.output.color && !cli.no_color);
    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    let output = match format {
        OutputFormat::Text => ConsoleFormatter::format(&outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
    };
    println!("{}", output);

    Ok(exit_code(&outcome))
}

/// Command-line values take precedence over every config source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(secs) = cli.timeout {
        config.verification.timeout_secs = secs;
    }
    if let Some(max) = cli.max_attempts {
        config.verification.max_attempts = max;
    }
    if let Some(rule) = &cli.rule {
        config.quorum.rule = rule.clone();
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let Some(name) = path.file_name() else {
        bail!("invalid log file path: {}", path.display());
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn read_artifact(path: &Path, is_diff: bool) -> Result<ArtifactContent> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read artifact from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read artifact {}", path.display()))?
    };
    Ok(if is_diff {
        ArtifactContent::diff(text)
    } else {
        ArtifactContent::text(text)
    })
}

fn exit_code(outcome: &SessionOutcome) -> ExitCode {
    match outcome {
        SessionOutcome::Accepted { .. } => ExitCode::SUCCESS,
        SessionOutcome::ExhaustedRetries { .. } => ExitCode::from(EXIT_EXHAUSTED),
        SessionOutcome::FatalError { .. } => ExitCode::from(EXIT_FATAL),
    }
}
