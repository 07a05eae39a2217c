mod conversation;
mod document;
mod embedding;

pub use conversation::{Conversation, Role, Turn};
pub use document::{chunk_content, Document};
pub use embedding::Embedding;
