//! Application-level configuration.
//!
//! - [`VerificationParams`]: session loop control (timeouts, attempts,
//!   re-evaluation, quorum policy, backoff)

pub mod verification_params;

pub use verification_params::VerificationParams;
