//! Subprocess execution shared by command-backed adapters.
//!
//! Runs an external program with a payload on stdin and captures its output.
//! Children are killed when the awaiting future is dropped (pool timeouts and
//! cancellation abort the future) and, on Linux, when this process dies.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

/// Diagnostic text kept per stream (1 MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Why a stream cannot be taken verbatim
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    #[error("output is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("output is not valid UTF-8 (first bad byte at offset {offset})")]
    NotUtf8 { offset: usize },
}

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: HashMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: HashMap::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Resolve the program on `PATH` (or as a path).
    pub fn resolve(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }

    /// `program arg1 arg2 …` for logs
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout for diagnostics: lossy and capped.
    pub fn stdout_lossy(&self) -> String {
        capped(&self.stdout)
    }

    /// Stderr for diagnostics: lossy and capped.
    pub fn stderr_lossy(&self) -> String {
        capped(&self.stderr)
    }

    /// Stdout exactly as written, or an error if it is larger than `limit`
    /// bytes or not UTF-8.
    pub fn into_stdout_text(self, limit: usize) -> Result<String, OutputError> {
        if self.stdout.len() > limit {
            return Err(OutputError::TooLarge {
                size: self.stdout.len(),
                limit,
            });
        }
        String::from_utf8(self.stdout).map_err(|e| OutputError::NotUtf8 {
            offset: e.utf8_error().valid_up_to(),
        })
    }
}

/// Run `spec`, write `input` to its stdin, and wait for it to exit.
pub async fn run_with_input(spec: &CommandSpec, input: &str) -> std::io::Result<ProcessOutput> {
    let started = Instant::now();
    debug!("Running {}", spec.display());

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(&spec.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.working_dir {
        cmd.current_dir(dir);
    }

    // Linux: request kernel to send SIGTERM to child when parent dies.
    #[cfg(target_os = "linux")]
    unsafe {
        cmd.pre_exec(|| {
            libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
            Ok(())
        });
    }

    let mut child = cmd.spawn()?;

    // Feed stdin concurrently so a child that writes before reading cannot
    // deadlock on a full pipe.
    if let Some(mut stdin) = child.stdin.take() {
        let payload = input.as_bytes().to_vec();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&payload).await {
                trace!("stdin closed early: {}", e);
            }
        });
    }

    let output = child.wait_with_output().await?;
    let result = ProcessOutput {
        code: output.status.code(),
        stdout: output.stdout,
        stderr: output.stderr,
        elapsed: started.elapsed(),
    };
    debug!(
        "{} exited with {:?} after {:?}",
        spec.display(),
        result.code,
        result.elapsed
    );
    Ok(result)
}

fn capped(bytes: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.len() > MAX_OUTPUT_SIZE {
        let mut end = MAX_OUTPUT_SIZE;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push_str("\n... (output truncated)");
    }
    text
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").with_args(vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_pipes_stdin_to_stdout() {
        let output = run_with_input(&sh("cat"), "hello\nworld").await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout_lossy(), "hello\nworld");
    }

    #[tokio::test]
    async fn test_captures_exit_code_and_stderr() {
        let output = run_with_input(&sh("echo oops >&2; exit 3"), "").await.unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stderr_lossy().trim(), "oops");
    }

    #[tokio::test]
    async fn test_passes_environment() {
        let spec = sh("printf %s \"$SUPERVISOR_TASK\"").with_env("SUPERVISOR_TASK", "sort a list");
        let output = run_with_input(&spec, "").await.unwrap();
        assert_eq!(output.stdout_lossy(), "sort a list");
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let spec = CommandSpec::new("definitely-not-a-real-program-4821");
        assert!(spec.resolve().is_none());
        let err = run_with_input(&spec, "").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    fn finished(stdout: &[u8]) -> ProcessOutput {
        ProcessOutput {
            code: Some(0),
            stdout: stdout.to_vec(),
            stderr: Vec::new(),
            elapsed: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_stdout_text_is_verbatim_or_rejected() {
        assert_eq!(finished(b"fn main() {}").into_stdout_text(64).unwrap(), "fn main() {}");
        assert_eq!(
            finished(&[b'a'; 65]).into_stdout_text(64),
            Err(OutputError::TooLarge {
                size: 65,
                limit: 64
            })
        );
        assert_eq!(
            finished(b"ok \xff\xfe").into_stdout_text(64),
            Err(OutputError::NotUtf8 { offset: 3 })
        );
    }

    #[test]
    fn test_capped_keeps_char_boundary() {
        let long = "é".repeat(MAX_OUTPUT_SIZE);
        let text = capped(long.as_bytes());
        assert!(text.ends_with("(output truncated)"));
    }
}
