//! Artifacts under review.
//!
//! An [`Artifact`] is the candidate output of the external producer: a single
//! file, a diff, or a whole file set, paired with the task description that
//! asked for it and the attempt that generated it.

pub mod entities;

pub use entities::{Artifact, ArtifactContent, ArtifactFile, ArtifactId};
