use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    Document, DomainError, Embedding,
};

/// Append-only, brute-force cosine-similarity store.
///
/// Documents live in a `Vec` behind one `RwLock`, so appends are amortized O(1)
/// and queries are a linear scan. The embedding call of both paths runs outside
/// the lock.
pub struct InMemoryVectorStore {
    embedding: Arc<dyn EmbeddingService>,
    documents: RwLock<Vec<Document>>,
}

impl InMemoryVectorStore {
    pub fn new(embedding: Arc<dyn EmbeddingService>) -> Self {
        Self {
            embedding,
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Dimensionality fixed by the first stored document.
    pub fn dimension(&self) -> Option<usize> {
        self.documents
            .read()
            .ok()
            .and_then(|docs| docs.first().map(|d| d.embedding().dimension()))
    }
}

fn check_dimension(expected: usize, embedding: &Embedding) -> Result<(), DomainError> {
    if embedding.dimension() == expected {
        Ok(())
    } else {
        Err(DomainError::DimensionMismatch {
            expected,
            actual: embedding.dimension(),
        })
    }
}

/// Indices ordered by descending score; equal scores keep insertion order.
fn rank(scores: &[f32], top_k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order.truncate(top_k);
    order
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn add_document(&self, text: &str) -> Result<(), DomainError> {
        let embedding = self.embedding.embed(text).await?;

        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        if let Some(first) = documents.first() {
            check_dimension(first.embedding().dimension(), &embedding)?;
        }

        documents.push(Document::new(text, embedding));
        debug!(total = documents.len(), "document added");
        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn retrieve_similar(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<String>, DomainError> {
        if self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .is_empty()
        {
            return Err(DomainError::EmptyStore);
        }

        let query = self.embedding.embed(query).await?.normalized();

        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        if let Some(first) = documents.first() {
            check_dimension(first.embedding().dimension(), &query)?;
        }

        let scores: Vec<f32> = documents
            .iter()
            .map(|doc| doc.embedding().normalized().dot(&query))
            .collect();

        Ok(rank(&scores, top_k)
            .into_iter()
            .map(|i| documents[i].text().to_string())
            .collect())
    }

    fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }
}
