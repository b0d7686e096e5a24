//! Progress notification port
//!
//! Defines the interface for reporting progress during a verification
//! session. Every callback is fire-and-forget: notifiers must not block and
//! cannot influence the session.

use std::time::Duration;
use supervisor_domain::{
    Artifact, CorrectionRequest, Decision, SessionId, SessionOutcome, Verdict,
};
use tokio::sync::mpsc;
use tracing::debug;

/// Callback for progress updates during a verification session
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, channels).
pub trait VerificationProgressNotifier: Send + Sync {
    /// Called once the session has an artifact and is about to evaluate it
    fn on_session_start(&self, _session: &SessionId, _artifact: &Artifact, _verifiers: usize) {}

    /// Called when a round is dispatched to the pool
    fn on_round_start(&self, _round: u32, _attempt: u32, _verifiers: usize, _timeout: Duration) {}

    /// Called as each verifier finishes, in arrival order
    fn on_verifier_complete(&self, _verdict: &Verdict) {}

    /// Called with the aggregated decision of a round
    fn on_decision(&self, _decision: &Decision) {}

    /// Called before waiting for the producer to regenerate
    fn on_regeneration(&self, _request: &CorrectionRequest, _regeneration: u32, _delay: Duration) {}

    /// Called when the producer fails to deliver an artifact
    fn on_producer_failure(&self, _attempt: u32, _message: &str) {}

    /// Called once with the terminal outcome
    fn on_outcome(&self, _outcome: &SessionOutcome) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl VerificationProgressNotifier for NoProgress {}

/// Forwards every decision to a bounded channel.
///
/// Uses `try_send`, so a slow or gone consumer never stalls the session;
/// decisions that do not fit are dropped.
pub struct ChannelProgress {
    sender: mpsc::Sender<Decision>,
}

impl ChannelProgress {
    pub fn new(sender: mpsc::Sender<Decision>) -> Self {
        Self { sender }
    }

    /// Create a notifier together with its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Decision>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl VerificationProgressNotifier for ChannelProgress {
    fn on_decision(&self, decision: &Decision) {
        if let Err(e) = self.sender.try_send(decision.clone()) {
            debug!("Dropping decision for round {}: {}", decision.round, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supervisor_domain::{QuorumPolicy, RoundResult, aggregate};

    fn decision(round: u32) -> Decision {
        let result = RoundResult::new(
            vec![Verdict::approve("a"), Verdict::approve("b")],
            Duration::from_millis(1),
        );
        aggregate(&result, &QuorumPolicy::default(), round, 1)
    }

    #[tokio::test]
    async fn test_channel_progress_forwards_decisions() {
        let (progress, mut rx) = ChannelProgress::channel(4);
        progress.on_decision(&decision(1));
        progress.on_decision(&decision(2));

        assert_eq!(rx.recv().await.map(|d| d.round), Some(1));
        assert_eq!(rx.recv().await.map(|d| d.round), Some(2));
    }

    #[test]
    fn test_channel_progress_never_blocks_when_full() {
        let (progress, mut rx) = ChannelProgress::channel(1);
        progress.on_decision(&decision(1));
        progress.on_decision(&decision(2));

        assert_eq!(rx.try_recv().map(|d| d.round), Ok(1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_progress_tolerates_closed_receiver() {
        let (progress, rx) = ChannelProgress::channel(1);
        drop(rx);
        progress.on_decision(&decision(1));
    }
}
