//! Structured findings reported by verifiers

use crate::core::string::normalize;
use serde::{Deserialize, Serialize};

/// What kind of problem an issue describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Syntax,
    Logic,
    Security,
    Incompleteness,
    InconsistencyWithTask,
    Other,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Syntax => "syntax",
            IssueCategory::Logic => "logic",
            IssueCategory::Security => "security",
            IssueCategory::Incompleteness => "incompleteness",
            IssueCategory::InconsistencyWithTask => "inconsistency_with_task",
            IssueCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "syntax" => Ok(IssueCategory::Syntax),
            "logic" => Ok(IssueCategory::Logic),
            "security" => Ok(IssueCategory::Security),
            "incompleteness" | "incomplete" => Ok(IssueCategory::Incompleteness),
            "inconsistency_with_task" | "inconsistency" | "task" => {
                Ok(IssueCategory::InconsistencyWithTask)
            }
            "other" => Ok(IssueCategory::Other),
            other => Err(format!("Unknown issue category: {}", other)),
        }
    }
}

/// How serious an issue is.
///
/// Ordering follows urgency: `Critical < Major < Minor`, so sorting
/// ascending lists critical issues first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Critical,
    Major,
    Minor,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Critical => "critical",
            IssueSeverity::Major => "major",
            IssueSeverity::Minor => "minor",
        }
    }
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" | "error" => Ok(IssueSeverity::Critical),
            "major" | "warning" => Ok(IssueSeverity::Major),
            "minor" | "info" | "note" => Ok(IssueSeverity::Minor),
            other => Err(format!("Unknown issue severity: {}", other)),
        }
    }
}

/// A single finding
///
/// # Example
///
/// ```
/// use supervisor_domain::verdict::{Issue, IssueCategory, IssueSeverity};
///
/// let issue = Issue::new(IssueCategory::Security, IssueSeverity::Critical, "SQL built by string concatenation")
///     .at("src/db.rs:42");
/// assert_eq!(issue.location.as_deref(), Some("src/db.rs:42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    pub severity: IssueSeverity,
    /// Human-readable description
    pub description: String,
    /// Optional file/line or section hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Issue {
    pub fn new(
        category: IssueCategory,
        severity: IssueSeverity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            location: None,
        }
    }

    pub fn critical(category: IssueCategory, description: impl Into<String>) -> Self {
        Self::new(category, IssueSeverity::Critical, description)
    }

    pub fn major(category: IssueCategory, description: impl Into<String>) -> Self {
        Self::new(category, IssueSeverity::Major, description)
    }

    pub fn minor(category: IssueCategory, description: impl Into<String>) -> Self {
        Self::new(category, IssueSeverity::Minor, description)
    }

    /// Attach a location hint
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Whether the finding should block acceptance on its own
    pub fn is_blocking(&self) -> bool {
        self.severity != IssueSeverity::Minor
    }

    /// Key used to recognise the same finding reported by several verifiers.
    ///
    /// Severity is deliberately not part of the key: two verifiers
    /// disagreeing on severity still describe one finding.
    pub fn dedup_key(&self) -> (IssueCategory, String, Option<String>) {
        (
            self.category,
            normalize(&self.description),
            self.location.as_deref().map(normalize),
        )
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}] {}", self.severity, self.category, self.description)?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}
