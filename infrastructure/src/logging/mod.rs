//! Logging infrastructure: structured decision logging.
//!
//! Provides [`JsonlVerificationLogger`], a JSONL file writer that implements
//! the [`VerificationLogger`](supervisor_application::VerificationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlVerificationLogger;
