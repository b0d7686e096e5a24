//! Correction requests
//!
//! A [`CorrectionRequest`] packages everything the producer needs to fix a
//! rejected artifact: the original intent, the rejected content and the
//! merged issues, critical ones first.

use crate::artifact::{Artifact, ArtifactContent, ArtifactId};
use crate::quorum::{Decision, MergedIssue};
use crate::verdict::{Issue, IssueSeverity};
use serde::{Deserialize, Serialize};

/// Request sent to the producer after a rejected round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRequest {
    /// Original natural-language intent
    pub task: String,
    /// Artifact that was rejected
    pub artifact_id: ArtifactId,
    /// Attempt number of the rejected artifact
    pub attempt: u32,
    /// Round that rejected it
    pub round: u32,
    /// Rejected content, verbatim
    pub original_content: ArtifactContent,
    /// Merged issues ordered critical → major → minor, stable within a severity
    pub issues: Vec<MergedIssue>,
    /// Approvals vs. completed verifiers, e.g. "1/3 approved"
    pub vote_line: String,
}

impl CorrectionRequest {
    /// Build a correction request from a rejected artifact and its decision.
    pub fn from_decision(artifact: &Artifact, decision: &Decision) -> Self {
        let mut issues = decision.issues.clone();
        // sort_by_key is stable: reporters' order survives within a severity
        issues.sort_by_key(|m| m.issue.severity);

        Self {
            task: artifact.task.clone(),
            artifact_id: artifact.id.clone(),
            attempt: artifact.attempt,
            round: decision.round,
            original_content: artifact.content.clone(),
            issues,
            vote_line: format!(
                "{}/{} approved ({} dispatched)",
                decision.approvals, decision.completed, decision.dispatched
            ),
        }
    }

    /// Issues without reporter annotations
    pub fn plain_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().map(|m| &m.issue)
    }

    /// Issues of one severity, in forwarding order
    pub fn issues_with_severity(&self, severity: IssueSeverity) -> Vec<&MergedIssue> {
        self.issues
            .iter()
            .filter(|m| m.issue.severity == severity)
            .collect()
    }

    /// Whether any critical finding must be addressed
    pub fn has_critical(&self) -> bool {
        self.issues
            .iter()
            .any(|m| m.issue.severity == IssueSeverity::Critical)
    }

    /// Render the request as prompt text for a producer.
    pub fn render_prompt(&self) -> String {
        let mut out = String::new();

        out.push_str("## Task\n\n");
        out.push_str(self.task.trim());
        out.push_str("\n\n");

        out.push_str(&format!(
            "## Review result\n\nAttempt {} was rejected in round {} ({}).\n\n",
            self.attempt, self.round, self.vote_line
        ));

        out.push_str("## Issues to fix\n");
        if self.issues.is_empty() {
            out.push_str("\nNo specific issues were reported; re-check the artifact against the task.\n");
        }
        for severity in [
            IssueSeverity::Critical,
            IssueSeverity::Major,
            IssueSeverity::Minor,
        ] {
            let group = self.issues_with_severity(severity);
            if group.is_empty() {
                continue;
            }
            out.push_str(&format!("\n### {}\n\n", severity.as_str().to_uppercase()));
            for merged in group {
                let issue = &merged.issue;
                out.push_str(&format!("- [{}] {}", issue.category, issue.description));
                if let Some(location) = &issue.location {
                    out.push_str(&format!(" ({})", location));
                }
                let reporters = merged
                    .reported_by
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!(" (reported by {})\n", reporters));
            }
        }

        out.push_str(&format!(
            "\n## Previous {} artifact\n\n```\n{}\n```\n",
            self.original_content.kind(),
            self.original_content.render()
        ));

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::{QuorumPolicy, aggregate};
    use crate::verdict::{IssueCategory, RoundResult, Verdict};
    use std::time::Duration;

    fn rejected_decision() -> (Artifact, Decision) {
        let artifact = Artifact::new(
            "Parse a CSV line",
            ArtifactContent::text("fn parse(l: &str) { todo!() }"),
        );
        let round = RoundResult::new(
            vec![
                Verdict::reject(
                    "heuristic",
                    vec![
                        Issue::minor(IssueCategory::Other, "Short parameter name"),
                        Issue::major(IssueCategory::Incompleteness, "todo!() placeholder")
                            .at("line 1"),
                    ],
                ),
                Verdict::reject(
                    "reviewer",
                    vec![Issue::critical(IssueCategory::Logic, "Quoted fields not handled")],
                ),
                Verdict::approve("tests"),
            ],
            Duration::from_millis(30),
        );
        let decision = aggregate(&round, &QuorumPolicy::default(), 1, artifact.attempt);
        (artifact, decision)
    }

    #[test]
    fn test_issues_forwarded_without_loss() {
        let (artifact, decision) = rejected_decision();
        let request = CorrectionRequest::from_decision(&artifact, &decision);

        let mut forwarded: Vec<Issue> = request.plain_issues().cloned().collect();
        let mut reported: Vec<Issue> = decision.plain_issues().cloned().collect();
        forwarded.sort_by(|a, b| a.description.cmp(&b.description));
        reported.sort_by(|a, b| a.description.cmp(&b.description));
        assert_eq!(forwarded, reported);
    }

    #[test]
    fn test_issues_grouped_critical_first() {
        let (artifact, decision) = rejected_decision();
        let request = CorrectionRequest::from_decision(&artifact, &decision);

        let severities: Vec<IssueSeverity> = request.plain_issues().map(|i| i.severity).collect();
        assert_eq!(
            severities,
            vec![
                IssueSeverity::Critical,
                IssueSeverity::Major,
                IssueSeverity::Minor
            ]
        );
        assert!(request.has_critical());
        assert_eq!(request.issues_with_severity(IssueSeverity::Major).len(), 1);
    }

    #[test]
    fn test_request_carries_task_and_content() {
        let (artifact, decision) = rejected_decision();
        let request = CorrectionRequest::from_decision(&artifact, &decision);

        assert_eq!(request.task, "Parse a CSV line");
        assert_eq!(request.original_content, artifact.content);
        assert_eq!(request.artifact_id, artifact.id);
        assert_eq!(request.attempt, 1);
        assert_eq!(request.vote_line, "1/3 approved (3 dispatched)");
    }

    #[test]
    fn test_render_prompt() {
        let (artifact, decision) = rejected_decision();
        let prompt = CorrectionRequest::from_decision(&artifact, &decision).render_prompt();

        assert!(prompt.contains("## Task\n\nParse a CSV line"));
        let critical = prompt.find("### CRITICAL").unwrap();
        let major = prompt.find("### MAJOR").unwrap();
        let minor = prompt.find("### MINOR").unwrap();
        assert!(critical < major && major < minor);
        assert!(prompt.contains("- [incompleteness] todo!() placeholder (line 1) (reported by heuristic)"));
        assert!(prompt.contains("fn parse(l: &str) { todo!() }"));
    }
}
