mod azure;

pub use azure::AzureChatLlm;
