mod azure;

pub use azure::AzureEmbedding;
