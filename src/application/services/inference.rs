use std::sync::Arc;
use tracing::{debug, instrument};

use crate::application::retry::RetryPolicy;
use crate::domain::{ports::LlmService, Conversation, DomainError, ValidationError};

/// Sends a conversation plus a new user message to a chat model, retrying
/// rate-limited calls according to its [`RetryPolicy`].
pub struct ModelInvoker {
    llm: Arc<dyn LlmService>,
    retry: RetryPolicy,
}

impl ModelInvoker {
    pub fn new(llm: Arc<dyn LlmService>, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    /// Returns `history` extended with the user turn and the model's reply.
    #[instrument(skip(self, history, user_query), fields(history_len = history.len()))]
    pub async fn invoke(
        &self,
        history: &Conversation,
        user_query: &str,
    ) -> Result<Conversation, DomainError> {
        if user_query.is_empty() {
            return Err(ValidationError::MissingQuery.into());
        }
        let conversation = history.with_user_turn(user_query)?;

        let llm = &self.llm;
        let turns = conversation.turns();
        let reply = self
            .retry
            .run(move |attempt| async move {
                debug!(attempt, turns = turns.len(), "requesting chat completion");
                llm.chat(turns).await
            })
            .await?;

        Ok(conversation.with_assistant_turn(reply))
    }
}
