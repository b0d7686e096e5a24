//! Application layer for supervisor-quorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::VerificationParams;
pub use ports::{
    artifact_producer::{ArtifactProducer, ProducerError},
    composite_progress::CompositeProgress,
    progress::{ChannelProgress, NoProgress, VerificationProgressNotifier},
    verification_logger::{NoVerificationLogger, VerificationEvent, VerificationLogger},
    verifier::{CheckReport, Verifier, VerifierError},
};
pub use use_cases::regeneration::{RegenerationController, RegenerationError};
pub use use_cases::run_verification::{RunVerificationUseCase, VerificationRequest};
pub use use_cases::verifier_pool::{PoolError, VerifierPool};
