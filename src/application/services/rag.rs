use std::sync::Arc;
use tracing::{info, instrument};

use crate::application::services::ModelInvoker;
use crate::domain::{
    chunk_content, fill_context_prompt, ports::VectorStore, Conversation, DomainError,
    PromptTemplate, ValidationError,
};

/// Retrieval, prompt filling and model invocation, in that order.
pub struct RagService {
    store: Arc<dyn VectorStore>,
    invoker: Arc<ModelInvoker>,
    template: PromptTemplate,
    top_k: usize,
    chunk_size: usize,
}

impl RagService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        invoker: Arc<ModelInvoker>,
        template: PromptTemplate,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            invoker,
            template,
            top_k,
            chunk_size: 1000,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    #[instrument(skip(self, query), fields(top_k = self.top_k))]
    pub async fn answer(&self, query: &str) -> Result<String, DomainError> {
        if query.trim().is_empty() {
            return Err(ValidationError::MissingQuery.into());
        }

        let context = self.store.retrieve_similar(query, self.top_k).await?;
        let prompt = fill_context_prompt(&self.template, &context, query)?;

        let conversation = self.invoker.invoke(&Conversation::new(), &prompt).await?;
        conversation
            .last_assistant_reply()
            .map(str::to_owned)
            .ok_or_else(|| DomainError::internal("model returned no assistant turn"))
    }

    /// Splits `content` into paragraph chunks and stores each one.
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub async fn ingest(&self, content: &str) -> Result<usize, DomainError> {
        let chunks = chunk_content(content, self.chunk_size);
        if chunks.is_empty() {
            return Err(ValidationError::EmptyDocument.into());
        }

        for chunk in &chunks {
            self.store.add_document(chunk).await?;
        }

        info!(documents = chunks.len(), total = self.store.len(), "ingested content");
        Ok(chunks.len())
    }
}
