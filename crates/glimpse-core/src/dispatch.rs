//! Single-model recognition dispatch.
//!
//! The dispatcher validates the model config, resolves the prompt and the
//! adapter, acquires the image and invokes the adapter through the retry
//! executor. It keeps no mutable state between requests.

use crate::config::Config;
use crate::error::RecognitionError;
use crate::image::{ImageAcquirer, ImageInput};
use crate::prompt;
use crate::provider::{with_retry, AdapterRegistry, RecognitionCall, RetryPolicy};
use crate::types::{ImageRef, ModelConfig, RecognitionRequest, RecognitionResult, RecognitionType};
use std::time::Instant;

/// Settings applied to every dispatch.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Completion token budget sent to providers
    pub max_tokens: u32,
    /// Accept plain-HTTP API URLs on loopback hosts
    pub allow_insecure_loopback: bool,
    /// Retry policy for downloads and provider calls
    pub retry: RetryPolicy,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            allow_insecure_loopback: false,
            retry: RetryPolicy::default(),
        }
    }
}

/// Routes recognition requests to provider adapters.
#[derive(Debug, Clone)]
pub struct RecognitionDispatcher {
    registry: AdapterRegistry,
    acquirer: ImageAcquirer,
    options: DispatchOptions,
}

impl RecognitionDispatcher {
    pub fn new(registry: AdapterRegistry, acquirer: ImageAcquirer, options: DispatchOptions) -> Self {
        Self {
            registry,
            acquirer,
            options,
        }
    }

    /// Dispatcher with the built-in adapters and limits from `config`.
    pub fn from_config(config: &Config) -> Self {
        let client = reqwest::Client::new();
        let options = DispatchOptions {
            max_tokens: config.recognition.max_tokens,
            allow_insecure_loopback: config.recognition.allow_insecure_loopback,
            retry: config.retry_policy(),
        };
        Self::new(
            AdapterRegistry::with_builtin(client.clone()),
            ImageAcquirer::new(client, config.limits.max_image_bytes()),
            options,
        )
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Recognize one image with one model.
    pub async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResult, RecognitionError> {
        // Fail on a bad config before touching the network or disk.
        self.check(&request.model_config)?;

        let image = self.acquire(&request.image).await?;
        self.recognize_image(
            &image,
            &request.model_config,
            request.recognition_type,
            request.prompt_override.as_deref(),
        )
        .await
    }

    /// Validate a model config and make sure an adapter serves it.
    pub fn check(&self, config: &ModelConfig) -> Result<(), RecognitionError> {
        config.validate(self.options.allow_insecure_loopback)?;
        self.registry.resolve(config)?;
        Ok(())
    }

    /// Acquire and encode an image, retrying transient download failures.
    pub async fn acquire(&self, image: &ImageRef) -> Result<ImageInput, RecognitionError> {
        with_retry(&self.options.retry, "image download", || {
            self.acquirer.acquire(image)
        })
        .await
    }

    /// Recognize an already-acquired image.
    ///
    /// Lets callers that send one image to several models download it once.
    pub async fn recognize_image(
        &self,
        image: &ImageInput,
        config: &ModelConfig,
        recognition_type: RecognitionType,
        prompt_override: Option<&str>,
    ) -> Result<RecognitionResult, RecognitionError> {
        let base_url = config.validate(self.options.allow_insecure_loopback)?;
        let adapter = self.registry.resolve(config)?;
        let prompt = prompt::resolve(recognition_type, prompt_override);

        let call = RecognitionCall {
            image,
            prompt: &prompt,
            config,
            base_url: &base_url,
            max_tokens: self.options.max_tokens,
        };

        let start = Instant::now();
        tracing::debug!(
            "Dispatching {} ({} recognition, {} bytes)",
            config.identifier(),
            recognition_type,
            image.size_bytes
        );
        let outcome = with_retry(&self.options.retry, adapter.name(), || {
            adapter.recognize(&call)
        })
        .await;

        match &outcome {
            Ok(_) => tracing::debug!(
                "{} completed in {}ms",
                config.identifier(),
                start.elapsed().as_millis()
            ),
            Err(e) => tracing::warn!("{} failed: {e}", config.identifier()),
        }
        outcome
    }
}
