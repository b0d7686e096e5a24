//! Port for structured decision logging.
//!
//! Defines the [`VerificationLogger`] trait for recording session events
//! (rounds, decisions, regeneration requests, outcomes) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures an audit
//! trail of every decision in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured verification event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. Adapters add the timestamp.
#[derive(Debug, Clone)]
pub struct VerificationEvent {
    /// Event type identifier (e.g., "round_completed", "session_finished").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl VerificationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging verification events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and non-fallible so a failing log never disturbs a
/// session; write errors are reported through `tracing` only.
pub trait VerificationLogger: Send + Sync {
    /// Record a verification event.
    fn log(&self, event: VerificationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoVerificationLogger;

impl VerificationLogger for NoVerificationLogger {
    fn log(&self, _event: VerificationEvent) {}
}
