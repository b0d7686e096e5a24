//! Heuristic verifier
//!
//! Cheap, deterministic checks that need no external tooling: blank content,
//! leftover placeholders, unbalanced delimiters and task keyword coverage.
//! Each configured instance runs a subset of checks, so several independent
//! heuristic verifiers can sit in one pool.

use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeSet;
use std::str::FromStr;
use supervisor_application::{CheckReport, Verifier, VerifierError};
use supervisor_domain::{Artifact, ArtifactContent, Issue, IssueCategory, VerifierId};

/// Markers that mean "not finished yet"
const DEFAULT_PLACEHOLDERS: &[&str] = &[
    r"\bTODO\b",
    r"\bFIXME\b",
    r"\bXXX\b",
    r"\btodo!\(",
    r"\bunimplemented!\(",
    r"(?i)lorem ipsum",
    r"^\s*(//|#)?\s*\.\.\.\s*$",
];

/// Words too common to say anything about task coverage
const STOPWORDS: &[&str] = &[
    "about", "after", "also", "based", "been", "being", "both", "each", "from", "have", "into",
    "make", "more", "must", "only", "other", "should", "some", "such", "than", "that", "their",
    "them", "then", "there", "these", "they", "this", "those", "using", "very", "what", "when",
    "where", "which", "while", "with", "would", "your", "write", "create", "implement",
];

/// One heuristic check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeuristicCheck {
    Blank,
    Placeholders,
    Delimiters,
    TaskCoverage,
}

impl HeuristicCheck {
    pub const ALL: [HeuristicCheck; 4] = [
        HeuristicCheck::Blank,
        HeuristicCheck::Placeholders,
        HeuristicCheck::Delimiters,
        HeuristicCheck::TaskCoverage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeuristicCheck::Blank => "blank",
            HeuristicCheck::Placeholders => "placeholders",
            HeuristicCheck::Delimiters => "delimiters",
            HeuristicCheck::TaskCoverage => "task_coverage",
        }
    }
}

impl FromStr for HeuristicCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "blank" | "empty" => Ok(HeuristicCheck::Blank),
            "placeholders" | "placeholder" => Ok(HeuristicCheck::Placeholders),
            "delimiters" | "balance" => Ok(HeuristicCheck::Delimiters),
            "task_coverage" | "coverage" => Ok(HeuristicCheck::TaskCoverage),
            other => Err(format!("unknown heuristic check '{}'", other)),
        }
    }
}

/// Verifier built from regex and counting heuristics
pub struct HeuristicVerifier {
    id: VerifierId,
    checks: BTreeSet<HeuristicCheck>,
    placeholders: Vec<Regex>,
    min_coverage: f64,
}

impl HeuristicVerifier {
    /// Verifier running every check with the default markers.
    pub fn new(id: impl Into<VerifierId>) -> Self {
        Self {
            id: id.into(),
            checks: HeuristicCheck::ALL.into_iter().collect(),
            placeholders: DEFAULT_PLACEHOLDERS
                .iter()
                .filter_map(|p| Regex::new(&format!("(?m){}", p)).ok())
                .collect(),
            min_coverage: 0.5,
        }
    }

    pub fn with_checks(mut self, checks: impl IntoIterator<Item = HeuristicCheck>) -> Self {
        self.checks = checks.into_iter().collect();
        self
    }

    /// Add literal markers (matched case-sensitively) to the placeholder check.
    pub fn with_extra_markers(mut self, markers: &[String]) -> Self {
        self.placeholders.extend(
            markers
                .iter()
                .filter(|m| !m.trim().is_empty())
                .filter_map(|m| Regex::new(&regex::escape(m)).ok()),
        );
        self
    }

    /// Fraction of task keywords the artifact must mention.
    pub fn with_min_coverage(mut self, min_coverage: f64) -> Self {
        self.min_coverage = if min_coverage.is_nan() {
            0.0
        } else {
            min_coverage.clamp(0.0, 1.0)
        };
        self
    }

    /// Run the configured checks; blocking issues are critical or major.
    pub fn inspect(&self, artifact: &Artifact) -> Vec<Issue> {
        let units = units(&artifact.content);
        let mut issues = Vec::new();

        for check in &self.checks {
            match check {
                HeuristicCheck::Blank => issues.extend(check_blank(&artifact.content, &units)),
                HeuristicCheck::Placeholders => {
                    for unit in &units {
                        issues.extend(self.check_placeholders(unit));
                    }
                }
                HeuristicCheck::Delimiters => {
                    // Hunks of a diff are fragments; only whole texts must balance
                    if !matches!(artifact.content, ArtifactContent::Diff { .. }) {
                        for unit in &units {
                            issues.extend(check_delimiters(unit));
                        }
                    }
                }
                HeuristicCheck::TaskCoverage => {
                    issues.extend(self.check_coverage(&artifact.task, &artifact.content.render()))
                }
            }
        }

        issues
    }

    fn check_placeholders(&self, unit: &Unit<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (index, line) in unit.text.lines().enumerate() {
            let line_no = index + 1 + unit.line_offset;
            if let Some(found) = self.placeholders.iter().find_map(|re| re.find(line)) {
                issues.push(
                    Issue::major(
                        IssueCategory::Incompleteness,
                        format!("placeholder left in output: '{}'", found.as_str().trim()),
                    )
                    .at(unit.location(line_no)),
                );
            }
        }
        issues
    }

    fn check_coverage(&self, task: &str, content: &str) -> Option<Issue> {
        let keywords = keywords(task);
        if keywords.len() < 2 {
            return None;
        }
        let haystack = content.to_lowercase();
        let missing: Vec<&str> = keywords
            .iter()
            .filter(|k| !haystack.contains(k.as_str()))
            .map(|k| k.as_str())
            .collect();
        let covered = keywords.len() - missing.len();
        let coverage = covered as f64 / keywords.len() as f64;

        if coverage < self.min_coverage {
            Some(Issue::major(
                IssueCategory::InconsistencyWithTask,
                format!(
                    "artifact mentions {} of {} task keywords (missing: {})",
                    covered,
                    keywords.len(),
                    missing.join(", ")
                ),
            ))
        } else {
            None
        }
    }
}

#[async_trait]
impl Verifier for HeuristicVerifier {
    fn id(&self) -> &VerifierId {
        &self.id
    }

    async fn check(&self, artifact: &Artifact) -> Result<CheckReport, VerifierError> {
        let issues = self.inspect(artifact);
        let blocking = issues.iter().filter(|i| i.is_blocking()).count();
        // Pattern matching is a weak signal; confidence drops with each finding
        let confidence = (0.8 - 0.1 * issues.len() as f64).max(0.3);
        let report = if blocking == 0 {
            CheckReport {
                approved: true,
                issues,
                confidence,
            }
        } else {
            CheckReport::reject(issues).with_confidence(confidence)
        };
        Ok(report)
    }
}

/// A separately checked piece of content
struct Unit<'a> {
    path: Option<&'a str>,
    text: &'a str,
    line_offset: usize,
}

impl Unit<'_> {
    fn location(&self, line: usize) -> String {
        match self.path {
            Some(path) => format!("{}:{}", path, line),
            None => format!("line {}", line),
        }
    }
}

fn units(content: &ArtifactContent) -> Vec<Unit<'_>> {
    match content {
        ArtifactContent::Text { text } => vec![Unit {
            path: None,
            text,
            line_offset: 0,
        }],
        ArtifactContent::Diff { diff } => vec![Unit {
            path: None,
            text: diff,
            line_offset: 0,
        }],
        ArtifactContent::Files { files } => files
            .iter()
            .map(|f| Unit {
                path: Some(f.path.as_str()),
                text: f.content.as_str(),
                line_offset: 0,
            })
            .collect(),
    }
}

fn check_blank(content: &ArtifactContent, units: &[Unit<'_>]) -> Vec<Issue> {
    if content.is_empty() {
        return vec![Issue::critical(
            IssueCategory::Incompleteness,
            "artifact is empty",
        )];
    }
    units
        .iter()
        .filter(|u| u.text.trim().is_empty())
        .filter_map(|u| u.path)
        .map(|path| {
            Issue::major(IssueCategory::Incompleteness, "file is empty").at(path.to_string())
        })
        .collect()
}

fn check_delimiters(unit: &Unit<'_>) -> Vec<Issue> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, line) in unit.text.lines().enumerate() {
        let line_no = index + 1 + unit.line_offset;
        for c in line.chars() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '`' => quote = Some(c),
                '(' | '[' | '{' => stack.push((c, line_no)),
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match stack.pop() {
                        Some((open, _)) if open == expected => {}
                        Some((open, opened_at)) => {
                            return vec![
                                Issue::critical(
                                    IssueCategory::Syntax,
                                    format!(
                                        "mismatched '{}' closes '{}' opened at line {}",
                                        c, open, opened_at
                                    ),
                                )
                                .at(unit.location(line_no)),
                            ];
                        }
                        None => {
                            return vec![
                                Issue::critical(
                                    IssueCategory::Syntax,
                                    format!("unexpected closing '{}'", c),
                                )
                                .at(unit.location(line_no)),
                            ];
                        }
                    }
                }
                _ => {}
            }
        }
        // Unterminated strings do not span lines in most languages
        if quote == Some('"') {
            quote = None;
        }
    }

    stack
        .last()
        .map(|(open, line)| {
            Issue::critical(IssueCategory::Syntax, format!("unclosed '{}'", open))
                .at(unit.location(*line))
        })
        .into_iter()
        .collect()
}

fn keywords(task: &str) -> BTreeSet<String> {
    task.split(|c: char| !c.is_alphanumeric() && c != '_')
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= 4 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use supervisor_domain::{ArtifactFile, IssueSeverity};

    fn text(task: &str, body: &str) -> Artifact {
        Artifact::new(task, ArtifactContent::text(body))
    }

    #[tokio::test]
    async fn test_clean_artifact_is_approved() {
        let verifier = HeuristicVerifier::new("heuristic");
        let artifact = text(
            "recursive fibonacci function",
            "/// Recursive fibonacci function.\nfn fibonacci(n: u32) -> u64 {\n    if n < 2 { n as u64 } else { fibonacci(n - 1) + fibonacci(n - 2) }\n}\n",
        );

        let report = verifier.check(&artifact).await.unwrap();
        assert!(report.approved, "unexpected issues: {:?}", report.issues);
        assert!(report.issues.is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_rejects_with_location() {
        let verifier =
            HeuristicVerifier::new("placeholders").with_checks([HeuristicCheck::Placeholders]);
        let artifact = text("parse config", "fn parse() {\n    todo!()\n}\n");

        let report = verifier.check(&artifact).await.unwrap();
        assert!(!report.approved);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].category, IssueCategory::Incompleteness);
        assert_eq!(report.issues[0].location.as_deref(), Some("line 2"));
    }

    #[test]
    fn test_extra_markers_are_literal() {
        let verifier = HeuristicVerifier::new("p")
            .with_checks([HeuristicCheck::Placeholders])
            .with_extra_markers(&["<insert here>".to_string()]);
        let issues = verifier.inspect(&text("t", "value = <insert here>"));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("<insert here>"));
    }

    #[test]
    fn test_unbalanced_delimiters() {
        let verifier = HeuristicVerifier::new("d").with_checks([HeuristicCheck::Delimiters]);

        let issues = verifier.inspect(&text("t", "fn main() {\n    call(1, 2;\n}\n"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Critical);
        assert_eq!(issues[0].category, IssueCategory::Syntax);

        let issues = verifier.inspect(&text("t", "fn main() {\n    run();\n"));
        assert_eq!(issues[0].description, "unclosed '{'");
        assert_eq!(issues[0].location.as_deref(), Some("line 1"));

        // delimiters inside strings do not count
        assert!(
            verifier
                .inspect(&text("t", "let s = \"(\";\nlet t = \"}\";\n"))
                .is_empty()
        );
    }

    #[test]
    fn test_delimiters_skip_diffs() {
        let verifier = HeuristicVerifier::new("d").with_checks([HeuristicCheck::Delimiters]);
        let artifact = Artifact::new("t", ArtifactContent::diff("@@ -1 +1 @@\n-fn a() {\n+fn b() {\n"));
        assert!(verifier.inspect(&artifact).is_empty());
    }

    #[test]
    fn test_blank_file_in_file_set() {
        let verifier = HeuristicVerifier::new("b").with_checks([HeuristicCheck::Blank]);
        let artifact = Artifact::new(
            "t",
            ArtifactContent::files(vec![
                ArtifactFile::new("src/lib.rs", "pub mod a;"),
                ArtifactFile::new("src/a.rs", "  \n"),
            ]),
        );
        let issues = verifier.inspect(&artifact);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location.as_deref(), Some("src/a.rs"));
    }

    #[test]
    fn test_task_coverage() {
        let verifier = HeuristicVerifier::new("c").with_checks([HeuristicCheck::TaskCoverage]);

        let issues = verifier.inspect(&text(
            "parse timestamps and validate timezone offsets",
            "fn add(a: i32, b: i32) -> i32 { a + b }",
        ));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::InconsistencyWithTask);
        assert!(issues[0].description.contains("timestamps"));

        let issues = verifier.inspect(&text(
            "parse timestamps and validate timezone offsets",
            "// parse timestamps, validate timezone\nfn parse_timestamps() {}",
        ));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_check_names_parse() {
        assert_eq!(
            "task-coverage".parse::<HeuristicCheck>(),
            Ok(HeuristicCheck::TaskCoverage)
        );
        assert_eq!("Blank".parse::<HeuristicCheck>(), Ok(HeuristicCheck::Blank));
        assert!("spelling".parse::<HeuristicCheck>().is_err());
    }
}
