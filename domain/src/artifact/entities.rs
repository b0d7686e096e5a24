//! Artifact entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_ARTIFACT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a process-unique id from the wall clock and a sequence number.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let seq = NEXT_ARTIFACT_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("artifact-{}-{}", millis, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One file of a multi-file artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub path: String,
    pub content: String,
}

impl ArtifactFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// The opaque payload being reviewed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactContent {
    /// A single source file or free-form text
    Text { text: String },
    /// A unified diff against existing sources
    Diff { diff: String },
    /// A set of files (e.g. a generated project)
    Files { files: Vec<ArtifactFile> },
}

impl ArtifactContent {
    pub fn text(text: impl Into<String>) -> Self {
        ArtifactContent::Text { text: text.into() }
    }

    pub fn diff(diff: impl Into<String>) -> Self {
        ArtifactContent::Diff { diff: diff.into() }
    }

    pub fn files(files: Vec<ArtifactFile>) -> Self {
        ArtifactContent::Files { files }
    }

    /// Whether there is nothing to review
    pub fn is_empty(&self) -> bool {
        match self {
            ArtifactContent::Text { text } => text.trim().is_empty(),
            ArtifactContent::Diff { diff } => diff.trim().is_empty(),
            ArtifactContent::Files { files } => files.iter().all(|f| f.content.trim().is_empty()),
        }
    }

    /// Short name of the content kind
    pub fn kind(&self) -> &'static str {
        match self {
            ArtifactContent::Text { .. } => "text",
            ArtifactContent::Diff { .. } => "diff",
            ArtifactContent::Files { .. } => "files",
        }
    }

    /// Total size of the payload in bytes
    pub fn len(&self) -> usize {
        match self {
            ArtifactContent::Text { text } => text.len(),
            ArtifactContent::Diff { diff } => diff.len(),
            ArtifactContent::Files { files } => files.iter().map(|f| f.content.len()).sum(),
        }
    }

    /// Render the whole payload as one text blob.
    ///
    /// File sets are rendered with a `=== path ===` header per file, which is
    /// the form handed to line-oriented verifiers and producers.
    pub fn render(&self) -> String {
        match self {
            ArtifactContent::Text { text } => text.clone(),
            ArtifactContent::Diff { diff } => diff.clone(),
            ArtifactContent::Files { files } => files
                .iter()
                .map(|f| format!("=== {} ===\n{}", f.path, f.content))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A candidate artifact produced for a task
///
/// # Example
///
/// ```
/// use supervisor_domain::artifact::{Artifact, ArtifactContent};
///
/// let artifact = Artifact::new("Write a fizzbuzz", ArtifactContent::text("fn main() {}"));
/// assert_eq!(artifact.attempt, 1);
///
/// let next = artifact.regenerated(ArtifactContent::text("fn main() { fizzbuzz(); }"));
/// assert_eq!(next.attempt, 2);
/// assert_ne!(next.id, artifact.id);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique id of this candidate
    pub id: ArtifactId,
    /// The payload under review
    pub content: ArtifactContent,
    /// Natural-language intent the artifact should satisfy
    pub task: String,
    /// Generation attempt that produced this artifact (1-indexed)
    pub attempt: u32,
}

impl Artifact {
    /// Create a first-attempt artifact
    pub fn new(task: impl Into<String>, content: ArtifactContent) -> Self {
        Self {
            id: ArtifactId::generate(),
            content,
            task: task.into(),
            attempt: 1,
        }
    }

    pub fn with_id(mut self, id: ArtifactId) -> Self {
        self.id = id;
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    /// Derive the next-attempt artifact for the same task
    pub fn regenerated(&self, content: ArtifactContent) -> Self {
        Self {
            id: ArtifactId::generate(),
            content,
            task: self.task.clone(),
            attempt: self.attempt + 1,
        }
    }

    /// Check the preconditions for handing this artifact to verifiers
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.task.trim().is_empty() {
            return Err(DomainError::EmptyTask);
        }
        if self.content.is_empty() {
            return Err(DomainError::EmptyArtifact);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ArtifactId::generate();
        let b = ArtifactId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("artifact-"));
    }

    #[test]
    fn test_content_is_empty() {
        assert!(ArtifactContent::text("  \n").is_empty());
        assert!(ArtifactContent::diff("").is_empty());
        assert!(ArtifactContent::files(vec![]).is_empty());
        assert!(ArtifactContent::files(vec![ArtifactFile::new("a.rs", " ")]).is_empty());
        assert!(!ArtifactContent::files(vec![ArtifactFile::new("a.rs", "fn a() {}")]).is_empty());
    }

    #[test]
    fn test_render_files() {
        let content = ArtifactContent::files(vec![
            ArtifactFile::new("src/lib.rs", "pub mod a;"),
            ArtifactFile::new("src/a.rs", "pub fn a() {}"),
        ]);
        let rendered = content.render();
        assert!(rendered.starts_with("=== src/lib.rs ===\npub mod a;"));
        assert!(rendered.contains("=== src/a.rs ===\npub fn a() {}"));
        assert_eq!(content.len(), "pub mod a;".len() + "pub fn a() {}".len());
    }

    #[test]
    fn test_regenerated_increments_attempt() {
        let first = Artifact::new("task", ArtifactContent::text("v1"));
        let second = first.regenerated(ArtifactContent::text("v2"));
        let third = second.regenerated(ArtifactContent::text("v3"));
        assert_eq!(first.attempt, 1);
        assert_eq!(second.attempt, 2);
        assert_eq!(third.attempt, 3);
        assert_eq!(third.task, "task");
    }

    #[test]
    fn test_validate() {
        assert!(Artifact::new("task", ArtifactContent::text("x")).validate().is_ok());
        assert_eq!(
            Artifact::new("task", ArtifactContent::text("")).validate(),
            Err(DomainError::EmptyArtifact)
        );
        assert_eq!(
            Artifact::new(" ", ArtifactContent::text("x")).validate(),
            Err(DomainError::EmptyTask)
        );
    }

    #[test]
    fn test_content_serde_tagged() {
        let json = serde_json::to_value(ArtifactContent::diff("+a")).unwrap();
        assert_eq!(json["kind"], "diff");
        assert_eq!(json["diff"], "+a");
    }
}
