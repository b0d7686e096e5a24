//! Composite progress notifier: delegates to multiple notifiers.
//!
//! Used to fan out session events to both the terminal reporter and a
//! decision channel simultaneously.

use super::progress::VerificationProgressNotifier;
use std::time::Duration;
use supervisor_domain::{
    Artifact, CorrectionRequest, Decision, SessionId, SessionOutcome, Verdict,
};

/// A progress notifier that delegates to multiple inner notifiers.
///
/// Uses borrowed references with a lifetime parameter so both owned and
/// borrowed notifiers can be composed without wrapper types.
pub struct CompositeProgress<'a> {
    delegates: Vec<&'a dyn VerificationProgressNotifier>,
}

impl<'a> CompositeProgress<'a> {
    pub fn new(delegates: Vec<&'a dyn VerificationProgressNotifier>) -> Self {
        Self { delegates }
    }
}

/// Macro to delegate a method call to all inner notifiers.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl VerificationProgressNotifier for CompositeProgress<'_> {
    fn on_session_start(&self, session: &SessionId, artifact: &Artifact, verifiers: usize) {
        delegate!(self, on_session_start, session, artifact, verifiers);
    }

    fn on_round_start(&self, round: u32, attempt: u32, verifiers: usize, timeout: Duration) {
        delegate!(self, on_round_start, round, attempt, verifiers, timeout);
    }

    fn on_verifier_complete(&self, verdict: &Verdict) {
        delegate!(self, on_verifier_complete, verdict);
    }

    fn on_decision(&self, decision: &Decision) {
        delegate!(self, on_decision, decision);
    }

    fn on_regeneration(&self, request: &CorrectionRequest, regeneration: u32, delay: Duration) {
        delegate!(self, on_regeneration, request, regeneration, delay);
    }

    fn on_producer_failure(&self, attempt: u32, message: &str) {
        delegate!(self, on_producer_failure, attempt, message);
    }

    fn on_outcome(&self, outcome: &SessionOutcome) {
        delegate!(self, on_outcome, outcome);
    }
}
