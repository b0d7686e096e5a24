//! Port definitions (interfaces for external dependencies)
//!
//! Adapters implementing these traits live in the infrastructure layer
//! (verifiers, producers, loggers) and the presentation layer (progress).

pub mod artifact_producer;
pub mod composite_progress;
pub mod progress;
pub mod verification_logger;
pub mod verifier;
