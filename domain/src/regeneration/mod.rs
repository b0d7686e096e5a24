//! Regeneration policy.
//!
//! - [`CorrectionRequest`]: what the producer is asked to fix after a rejection
//! - [`BackoffSchedule`]: delay between successive regeneration attempts

pub mod backoff;
pub mod correction;

pub use backoff::BackoffSchedule;
pub use correction::CorrectionRequest;
