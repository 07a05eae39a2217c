use crate::domain::{errors::DomainError, Turn};
use async_trait::async_trait;

/// A chat-completion backend. Returns the content of the next assistant turn.
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn chat(&self, turns: &[Turn]) -> Result<String, DomainError>;
}
