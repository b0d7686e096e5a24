//! Verification session domain
//!
//! A [`VerificationSession`] ties one artifact under review to its
//! evaluate → decide → regenerate cycle. It is a message-driven state
//! machine: the application layer feeds it decisions and producer results
//! and executes the [`SessionAction`] it answers with. No timing, I/O or
//! concurrency lives here.
//!
//! # States
//!
//! ```text
//!   Pending ──start──▶ Evaluating ──accepted──────────────▶ Accepted
//!                       │  ▲   │
//!       inconclusive ───┘  │   ├──rejected, retries left──▶ Regenerating
//!       (re-evaluate)      │   │                              │
//!                          │   └──rejected, no retries────▶ ExhaustedRetries
//!                          │                                  │
//!                          └────────new artifact──────────────┘
//!
//!   any non-terminal state ──unrecoverable──▶ FatalError
//! ```

pub mod entities;
pub mod outcome;
pub mod state;

pub use entities::{ProducerFailure, SessionAction, SessionId, SessionLimits, VerificationSession};
pub use outcome::{FatalCause, SessionOutcome, SessionReport};
pub use state::SessionState;
