//! Artifact producer adapters

mod command;
mod static_producer;

pub use command::{CommandArtifactProducer, DEFAULT_MAX_ARTIFACT_BYTES, ProducedKind};
pub use static_producer::StaticArtifactProducer;
