use thiserror::Error;

/// Input problems detected before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Context pieces are missing")]
    MissingContext,

    #[error("User query is missing")]
    MissingQuery,

    #[error("Document content is empty")]
    EmptyDocument,

    #[error("Conversation must end with the assistant writing")]
    ConversationOrder,

    #[error("No value supplied for placeholder ${0}")]
    UnknownPlaceholder(String),

    #[error("Invalid placeholder at offset {0}")]
    InvalidPlaceholder(usize),
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Vector store is empty")]
    EmptyStore,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Errors caused by the caller's input or the current store contents.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::EmptyStore)
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
