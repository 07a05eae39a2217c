use async_trait::async_trait;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::azure::AzureOpenAiClient;
use crate::infrastructure::config::EmbeddingConfig;

pub struct AzureEmbedding {
    client: AzureOpenAiClient,
    deployment: String,
}

impl AzureEmbedding {
    pub fn new(client: AzureOpenAiClient, deployment: impl Into<String>) -> Self {
        Self {
            client,
            deployment: deployment.into(),
        }
    }

    pub fn from_config(client: AzureOpenAiClient, config: &EmbeddingConfig) -> Self {
        Self::new(client, config.deployment.clone())
    }
}

#[async_trait]
impl EmbeddingService for AzureEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let vector = self.client.embedding(&self.deployment, text).await?;
        if vector.is_empty() {
            return Err(DomainError::external("embedding service returned an empty vector"));
        }
        Ok(Embedding::new(vector))
    }
}
