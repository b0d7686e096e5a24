//! Console output formatter for session outcomes

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use supervisor_domain::{
    Decision, DecisionOutcome, IssueSeverity, MergedIssue, SessionOutcome, Verdict,
};

/// Formats session outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force colors on or off for everything this crate prints
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// Format the complete session outcome
    pub fn format(outcome: &SessionOutcome) -> String {
        let report = outcome.report();
        let mut output = String::new();

        output.push_str(&Self::header("Verification Result"));
        output.push('\n');

        if let Some(artifact) = outcome.artifact() {
            output.push_str(&format!("{} {}\n", "Task:".cyan().bold(), artifact.task));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Outcome:".cyan().bold(),
            Self::outcome_line(outcome)
        ));
        output.push_str(&format!(
            "{} {}/{} attempt(s), {} round(s)\n",
            "Effort:".cyan().bold(),
            report.attempts,
            report.max_attempts,
            report.rounds()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Trail:".cyan().bold(),
            report
                .trail
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
                .dimmed()
        ));

        if !report.history.is_empty() {
            output.push_str(&Self::section_header("Rounds"));
            for decision in &report.history {
                output.push('\n');
                output.push_str(&Self::format_decision(decision));
            }
        }

        if !report.producer_failures.is_empty() {
            output.push_str(&Self::section_header("Producer Failures"));
            for failure in &report.producer_failures {
                output.push_str(&format!(
                    "  {} attempt {}: {}\n",
                    "x".red(),
                    failure.attempt,
                    failure.message
                ));
            }
        }

        if let Some(artifact) = outcome.artifact() {
            let title = match outcome {
                SessionOutcome::Accepted { .. } => "Accepted Artifact",
                _ => "Last Artifact",
            };
            output.push_str(&Self::section_header(title));
            output.push_str(&format!(
                "{}\n\n{}\n",
                format!(
                    "{} ({}, attempt {})",
                    artifact.id,
                    artifact.content.kind(),
                    artifact.attempt
                )
                .yellow()
                .bold(),
                Self::indent(&artifact.content.render(), "  ")
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &SessionOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// One round: vote line, each verdict, then merged issues.
    pub fn format_decision(decision: &Decision) -> String {
        let mut output = format!(
            "{} {} {} {} ({}/{} approved, {} needed, {}ms)\n",
            format!("Round {}", decision.round).bold(),
            format!("(attempt {})", decision.attempt).dimmed(),
            decision.vote_summary(),
            Self::decision_label(&decision.outcome),
            decision.approvals,
            decision.completed,
            decision.required_approvals,
            decision.elapsed_ms
        );

        for verdict in &decision.verdicts {
            output.push_str(&format!("  {}\n", Self::verdict_line(verdict)));
        }

        if !decision.issues.is_empty() {
            output.push_str(&format!("  {}\n", "Issues:".bold()));
            for merged in &decision.issues {
                output.push_str(&format!("    {}\n", Self::issue_line(merged)));
            }
        }
        output
    }

    fn outcome_line(outcome: &SessionOutcome) -> String {
        match outcome {
            SessionOutcome::Accepted { .. } => "ACCEPTED".green().bold().to_string(),
            SessionOutcome::ExhaustedRetries { .. } => {
                "EXHAUSTED RETRIES".yellow().bold().to_string()
            }
            SessionOutcome::FatalError { cause, .. } => {
                format!("{} ({})", "FATAL ERROR".red().bold(), cause)
            }
        }
    }

    fn decision_label(outcome: &DecisionOutcome) -> String {
        match outcome {
            DecisionOutcome::Accepted => "accepted".green().to_string(),
            DecisionOutcome::Rejected => "rejected".red().to_string(),
            DecisionOutcome::Inconclusive => "inconclusive".yellow().to_string(),
        }
    }

    fn verdict_line(verdict: &Verdict) -> String {
        let id = verdict.verifier.as_str();
        match verdict.non_completion() {
            Some(reason) => format!("{} {} {}", "-".dimmed(), id, reason.to_string().dimmed()),
            None if verdict.approved => format!(
                "{} {} approved ({}ms)",
                "v".green(),
                id,
                verdict.elapsed_ms
            ),
            None => format!(
                "{} {} rejected, {} issue(s) ({}ms)",
                "x".red(),
                id,
                verdict.issues.len(),
                verdict.elapsed_ms
            ),
        }
    }

    fn issue_line(merged: &MergedIssue) -> String {
        let issue = &merged.issue;
        let severity = match issue.severity {
            IssueSeverity::Critical => "CRITICAL".red().bold(),
            IssueSeverity::Major => "MAJOR".yellow().bold(),
            IssueSeverity::Minor => "MINOR".normal(),
        };
        let mut line = format!("[{}] {}: {}", severity, issue.category, issue.description);
        if let Some(location) = &issue.location {
            line.push_str(&format!(" ({})", location));
        }
        let reporters = merged
            .reported_by
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!(" {}", format!("[{}]", reporters).dimmed()));
        line
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &SessionOutcome) -> String {
        Self::format(outcome)
    }

    fn format_json(&self, outcome: &SessionOutcome) -> String {
        Self::format_json(outcome)
    }
}
