//! Glimpse Core - multi-provider image recognition library.
//!
//! Glimpse sends an image to vision-capable LLM providers with a
//! task-specific prompt and normalizes their answers. One image can be run
//! against several models to compare latency and confidence, or many images
//! can be run against one model in bounded waves.
//!
//! # Architecture
//!
//! ```text
//! ImageRef → Acquire/Encode → Prompt → Adapter (Gemini | OpenAI-compatible | Claude) → RecognitionResult
//!                                           ↑ retry executor
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use glimpse_core::{Config, ImageRef, ModelConfig, RecognitionDispatcher, RecognitionRequest, RecognitionType};
//!
//! #[tokio::main]
//! async fn main() -> glimpse_core::Result<()> {
//!     let config = Config::load()?;
//!     let dispatcher = RecognitionDispatcher::from_config(&config);
//!
//!     let request = RecognitionRequest {
//!         image: ImageRef::Local("./receipt.jpg".into()),
//!         model_config: ModelConfig::new("openai", "gpt-4o", "sk-..."),
//!         recognition_type: RecognitionType::Receipt,
//!         prompt_override: None,
//!     };
//!     let result = dispatcher.recognize(&request).await?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

pub mod compare;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod image;
pub mod output;
pub mod prompt;
pub mod provider;
pub mod types;

pub use compare::{
    compute_stats, run_in_waves, BatchItem, BatchRecognizer, ComparisonOptions,
    ComparisonOrchestrator, ComparisonReport, RunControl, RunState,
};
pub use config::Config;
pub use dispatch::{DispatchOptions, RecognitionDispatcher};
pub use error::{ConfigError, GlimpseError, RecognitionError, RecognizeResult, Result};
pub use image::{ImageAcquirer, ImageInput};
pub use output::{OutputFormat, OutputWriter};
pub use provider::{AdapterRegistry, ProviderAdapter, RetryPolicy};
pub use types::{
    ComparisonResult, ComparisonStatus, ImageRef, ModelConfig, PerformanceStats, ProviderKind,
    RecognitionRequest, RecognitionResponse, RecognitionResult, RecognitionType,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
