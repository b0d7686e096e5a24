//! Progress reporting for verification sessions
//!
//! Both reporters write to stderr so that stdout carries only the final
//! outcome (which may be JSON).

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use supervisor_application::VerificationProgressNotifier;
use supervisor_domain::{
    Artifact, CorrectionRequest, Decision, DecisionOutcome, SessionId, SessionOutcome, Verdict,
};

/// Reports progress with one progress bar per round
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn line(&self, text: String) {
        if self.multi.println(&text).is_err() {
            eprintln!("{}", text);
        }
    }

    fn verdict_mark(verdict: &Verdict) -> String {
        if !verdict.is_completed() {
            format!("{} {}", "-".dimmed(), verdict.verifier)
        } else if verdict.approved {
            format!("{} {}", "v".green(), verdict.verifier)
        } else {
            format!("{} {}", "x".red(), verdict.verifier)
        }
    }

    fn decision_text(decision: &Decision) -> String {
        let label = match decision.outcome {
            DecisionOutcome::Accepted => "accepted".green(),
            DecisionOutcome::Rejected => "rejected".red(),
            DecisionOutcome::Inconclusive => "inconclusive".yellow(),
        };
        format!(
            "{} {} ({}/{} approved)",
            decision.vote_summary(),
            label,
            decision.approvals,
            decision.completed
        )
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationProgressNotifier for ProgressReporter {
    fn on_session_start(&self, session: &SessionId, artifact: &Artifact, verifiers: usize) {
        self.line(format!(
            "{} {} ({} {}, {} verifier(s))",
            "->".cyan(),
            session.as_str().bold(),
            artifact.content.kind(),
            artifact.id,
            verifiers
        ));
    }

    fn on_round_start(&self, round: u32, attempt: u32, verifiers: usize, timeout: Duration) {
        let pb = self.multi.add(ProgressBar::new(verifiers as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(format!("Round {} / attempt {}", round, attempt));
        pb.set_message(format!("timeout {:?}", timeout));
        pb.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut slot) = self.round_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_verifier_complete(&self, verdict: &Verdict) {
        if let Ok(slot) = self.round_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(Self::verdict_mark(verdict));
            pb.inc(1);
        }
    }

    fn on_decision(&self, decision: &Decision) {
        let text = Self::decision_text(decision);
        let finished = self
            .round_bar
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .map(|pb| pb.finish_with_message(text.clone()))
            .is_some();
        if !finished {
            self.line(text);
        }
    }

    fn on_regeneration(&self, request: &CorrectionRequest, regeneration: u32, delay: Duration) {
        self.line(format!(
            "{} regenerating ({} #{}, {} issue(s), waiting {:?})",
            "<-".yellow(),
            "regeneration".bold(),
            regeneration,
            request.issues.len(),
            delay
        ));
    }

    fn on_producer_failure(&self, attempt: u32, message: &str) {
        self.line(format!(
            "{} producer failed on attempt {}: {}",
            "x".red(),
            attempt,
            message
        ));
    }

    fn on_outcome(&self, _outcome: &SessionOutcome) {
        if let Ok(mut slot) = self.round_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.abandon();
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl VerificationProgressNotifier for SimpleProgress {
    fn on_round_start(&self, round: u32, attempt: u32, verifiers: usize, _timeout: Duration) {
        eprintln!(
            "{} {} ({} verifiers)",
            "->".cyan(),
            format!("Round {} / attempt {}", round, attempt).bold(),
            verifiers
        );
    }

    fn on_verifier_complete(&self, verdict: &Verdict) {
        match verdict.non_completion() {
            Some(reason) => eprintln!("  {} ({})", ProgressReporter::verdict_mark(verdict), reason),
            None => eprintln!("  {}", ProgressReporter::verdict_mark(verdict)),
        }
    }

    fn on_decision(&self, decision: &Decision) {
        eprintln!("  {}", ProgressReporter::decision_text(decision));
    }

    fn on_regeneration(&self, request: &CorrectionRequest, regeneration: u32, _delay: Duration) {
        eprintln!(
            "{} regeneration #{} ({} issue(s) to fix)",
            "<-".yellow(),
            regeneration,
            request.issues.len()
        );
    }

    fn on_producer_failure(&self, attempt: u32, message: &str) {
        eprintln!("  {} producer failed on attempt {}: {}", "x".red(), attempt, message);
    }
}
