//! Session states

use serde::{Deserialize, Serialize};

/// State of a verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, nothing dispatched yet
    Pending,
    /// Verifiers are (about to be) evaluating the current artifact
    Evaluating,
    /// Waiting for the producer to return a corrected artifact
    Regenerating,
    /// Terminal: quorum accepted the artifact
    Accepted,
    /// Terminal: every attempt was used without acceptance
    ExhaustedRetries,
    /// Terminal: unrecoverable failure
    FatalError,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Accepted | SessionState::ExhaustedRetries | SessionState::FatalError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Pending => "pending",
            SessionState::Evaluating => "evaluating",
            SessionState::Regenerating => "regenerating",
            SessionState::Accepted => "accepted",
            SessionState::ExhaustedRetries => "exhausted_retries",
            SessionState::FatalError => "fatal_error",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
