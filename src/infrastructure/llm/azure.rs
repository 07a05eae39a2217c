use async_trait::async_trait;

use crate::domain::{ports::LlmService, DomainError, Turn};
use crate::infrastructure::azure::AzureOpenAiClient;
use crate::infrastructure::config::LlmConfig;

pub struct AzureChatLlm {
    client: AzureOpenAiClient,
    deployment: String,
}

impl AzureChatLlm {
    pub fn new(client: AzureOpenAiClient, deployment: impl Into<String>) -> Self {
        Self {
            client,
            deployment: deployment.into(),
        }
    }

    pub fn from_config(client: AzureOpenAiClient, config: &LlmConfig) -> Self {
        Self::new(client, config.deployment.clone())
    }
}

#[async_trait]
impl LlmService for AzureChatLlm {
    async fn chat(&self, turns: &[Turn]) -> Result<String, DomainError> {
        self.client.chat_completion(&self.deployment, turns).await
    }
}
