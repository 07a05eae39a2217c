//! Retrieval-augmented generation service.
//!
//! A query is embedded, ranked against an in-memory store of documents by
//! cosine similarity, and the top matches are filled into a prompt that is
//! sent to an Azure OpenAI chat deployment.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_support;
