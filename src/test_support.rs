//! Fakes for the domain ports, shared by unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::{
    ports::{EmbeddingService, LlmService},
    DomainError, Embedding, Turn,
};

/// Returns a fixed vector per known text; unknown texts fail like a remote error.
#[derive(Default)]
pub struct FakeEmbedding {
    vectors: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
}

impl FakeEmbedding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text)
            .cloned()
            .map(Embedding::new)
            .ok_or_else(|| DomainError::external(format!("no embedding for {text:?}")))
    }
}

/// Plays back queued replies in order and records every request.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, DomainError>>>,
    requests: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, content: &str) -> Self {
        self.push(Ok(content.to_string()))
    }

    pub fn fail(self, error: DomainError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: Result<String, DomainError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<Vec<Turn>> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn chat(&self, turns: &[Turn]) -> Result<String, DomainError> {
        self.requests.lock().unwrap().push(turns.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::internal("script exhausted")))
    }
}
