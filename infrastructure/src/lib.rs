//! Infrastructure layer for supervisor-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: concrete verifiers, artifact producers,
//! the JSONL decision log, and configuration file loading.

pub mod config;
pub mod logging;
pub mod process;
pub mod producers;
pub mod verifiers;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig,
    FileVerifierConfig,
};
pub use logging::JsonlVerificationLogger;
pub use producers::{CommandArtifactProducer, ProducedKind, StaticArtifactProducer};
pub use verifiers::{
    CommandVerifier, HeuristicCheck, HeuristicVerifier, VerifierBuildError, build_pool,
    build_verifier,
};
