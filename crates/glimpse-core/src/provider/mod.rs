//! Provider integration for image recognition.
//!
//! Provides an adapter abstraction over the provider wire protocols (Gemini,
//! OpenAI-compatible, Claude), a registry that picks the adapter for a model
//! config, and the retry executor that wraps every network call.

pub mod adapter;
pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod registry;
pub mod retry;

#[cfg(test)]
pub(crate) mod mock;

pub use adapter::{ProviderAdapter, RecognitionCall};
pub use anthropic::ClaudeAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiCompatibleAdapter;
pub use registry::AdapterRegistry;
pub use retry::{backoff_duration, with_retry, RetryPolicy};
