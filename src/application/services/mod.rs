mod inference;
mod rag;

pub use inference::ModelInvoker;
pub use rag::RagService;
