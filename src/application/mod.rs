//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than on the Azure
//! adapters, so they can be driven by fakes in tests.

pub mod retry;
pub mod services;

pub use retry::RetryPolicy;
pub use services::{ModelInvoker, RagService};
