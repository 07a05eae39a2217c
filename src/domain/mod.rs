pub mod entities;
pub mod errors;
pub mod ports;
pub mod prompt;

pub use entities::*;
pub use errors::{DomainError, Result, ValidationError};
pub use prompt::{fill_context_prompt, fill_system_prompt, PromptTemplate};
