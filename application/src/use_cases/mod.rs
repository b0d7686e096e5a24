//! Use cases (application services)

pub mod regeneration;
pub mod run_verification;
pub mod verifier_pool;
