//! Quorum consensus domain
//!
//! This module turns the verdicts of one evaluation round into a single
//! [`Decision`].
//!
//! # Flow
//!
//! ```text
//! RoundResult (one Verdict per dispatched verifier)
//!        │
//!        ▼
//! completed < min_completed ? ──yes──▶ Inconclusive
//!        │ no
//!        ▼
//! approvals ≥ threshold && not a tie ? ──yes──▶ Accepted
//!        │ no
//!        ▼
//!     Rejected (+ merged, deduplicated issues)
//! ```
//!
//! Verifiers that timed out or failed are counted as dispatched but never as
//! approving or rejecting. A round where exactly half of the completed
//! verifiers approve is rejected.

pub mod consensus;
pub mod policy;
pub mod rule;

pub use consensus::{Decision, DecisionOutcome, MergedIssue, aggregate};
pub use policy::QuorumPolicy;
pub use rule::QuorumRule;
