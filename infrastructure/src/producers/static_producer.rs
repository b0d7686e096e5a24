use async_trait::async_trait;
use supervisor_application::{ArtifactProducer, ProducerError};
use supervisor_domain::{Artifact, ArtifactContent, CorrectionRequest};

/// Producer for review-only runs: hands out one fixed artifact and cannot
/// correct it.
pub struct StaticArtifactProducer {
    content: ArtifactContent,
}

impl StaticArtifactProducer {
    pub fn new(content: ArtifactContent) -> Self {
        Self { content }
    }
}

#[async_trait]
impl ArtifactProducer for StaticArtifactProducer {
    fn name(&self) -> &str {
        "static"
    }

    async fn generate(&self, _task: &str) -> Result<ArtifactContent, ProducerError> {
        if self.content.is_empty() {
            return Err(ProducerError::Empty);
        }
        Ok(self.content.clone())
    }

    async fn regenerate(
        &self,
        _task: &str,
        _previous: &Artifact,
        _correction: &CorrectionRequest,
    ) -> Result<ArtifactContent, ProducerError> {
        Err(ProducerError::Unavailable(
            "no generator configured; artifact was supplied as-is".to_string(),
        ))
    }
}
