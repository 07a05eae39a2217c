use crate::domain::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn add_document(&self, text: &str) -> Result<(), DomainError>;

    /// Texts of the `top_k` most similar documents, most similar first.
    async fn retrieve_similar(&self, query: &str, top_k: usize)
        -> Result<Vec<String>, DomainError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
