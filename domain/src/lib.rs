//! Domain layer for supervisor-quorum
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure, async runtimes or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Verdicts
//!
//! Every independent verifier answers with a [`Verdict`]: approve or reject,
//! plus structured [`Issue`]s. A verifier that times out or crashes still
//! yields a verdict, marked as did-not-complete, so it is visible but never
//! counted as a vote.
//!
//! ## Quorum
//!
//! [`aggregate`] turns a [`RoundResult`] into a [`Decision`] under a
//! [`QuorumPolicy`]: accepted, rejected (ties included), or inconclusive when
//! too few verifiers completed.
//!
//! ## Session
//!
//! [`VerificationSession`] drives one artifact through evaluate → decide →
//! regenerate until it is accepted, runs out of attempts, or fails.

pub mod artifact;
pub mod config;
pub mod core;
pub mod quorum;
pub mod regeneration;
pub mod session;
pub mod verdict;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactContent, ArtifactFile, ArtifactId};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, PoolSetup, Severity};
pub use core::error::DomainError;
pub use quorum::{Decision, DecisionOutcome, MergedIssue, QuorumPolicy, QuorumRule, aggregate};
pub use regeneration::{BackoffSchedule, CorrectionRequest};
pub use session::{
    FatalCause, ProducerFailure, SessionAction, SessionId, SessionLimits, SessionOutcome,
    SessionReport, SessionState, VerificationSession,
};
pub use verdict::{
    Issue, IssueCategory, IssueSeverity, NonCompletion, RoundResult, Verdict, VerdictStatus,
    VerifierId,
};
