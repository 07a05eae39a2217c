pub mod azure;
pub mod config;
pub mod embedding;
pub mod llm;
pub mod vector_store;

pub use azure::AzureOpenAiClient;
pub use config::{AppConfig, Config, PromptsConfig};
pub use embedding::AzureEmbedding;
pub use llm::AzureChatLlm;
pub use vector_store::InMemoryVectorStore;
