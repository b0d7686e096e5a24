//! Configuration file loading for supervisor-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SUPERVISOR_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./supervisor.toml` or `./.supervisor.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/supervisor-quorum/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBackoffConfig, FileConfig, FileLoggingConfig, FileOutputConfig,
    FileProducerConfig, FileQuorumConfig, FileVerificationConfig, FileVerifierConfig,
    VerifierKind, default_verifiers,
};
pub use loader::{ConfigError, ConfigLoader};
