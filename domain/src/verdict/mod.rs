//! Verifier opinions.
//!
//! - [`Issue`]: a structured finding (category, severity, location)
//! - [`Verdict`]: one verifier's opinion on one artifact, including the
//!   "did not complete" case for timeouts and verifier failures
//! - [`RoundResult`]: every verdict collected for one evaluation round

pub mod issue;
pub mod round;
pub mod verdict;

pub use issue::{Issue, IssueCategory, IssueSeverity};
pub use round::RoundResult;
pub use verdict::{NonCompletion, Verdict, VerdictStatus, VerifierId};
