//! Provider adapter trait and the call type every adapter receives.
//!
//! Adapters translate one normalized recognition call into a provider's wire
//! format, send it, and translate the answer back. They never retry; the
//! dispatcher wraps them in the retry executor.

use crate::error::RecognitionError;
use crate::image::ImageInput;
use crate::types::{ModelConfig, RecognitionResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Everything an adapter needs for one provider call.
#[derive(Debug, Clone, Copy)]
pub struct RecognitionCall<'a> {
    /// The image to recognize
    pub image: &'a ImageInput,
    /// Text prompt for the model
    pub prompt: &'a str,
    /// Model, credentials and provider label
    pub config: &'a ModelConfig,
    /// Validated API base URL without trailing slash
    pub base_url: &'a str,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// Trait that all provider adapters implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the registry hands out `Arc<dyn ProviderAdapter>`).
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Adapter name for logging and error messages (e.g., "gemini").
    fn name(&self) -> &str;

    /// Fixed confidence attached to every result.
    fn confidence(&self) -> f32;

    /// Send the call and normalize the provider's answer.
    async fn recognize(
        &self,
        call: &RecognitionCall<'_>,
    ) -> Result<RecognitionResult, RecognitionError>;
}

/// Classify a `reqwest` send failure.
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> RecognitionError {
    RecognitionError::NetworkTransport {
        provider: provider.to_string(),
        message: error.to_string(),
    }
}

/// Check the status and decode the body into the provider's response type.
///
/// Non-2xx responses become `ProviderHttp` carrying the body verbatim. A 2xx
/// body that does not match `T` is a contract break with the provider.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &str,
    resp: reqwest::Response,
) -> Result<T, RecognitionError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !status.is_success() {
        return Err(RecognitionError::ProviderHttp {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| RecognitionError::InvalidResponseShape {
        provider: provider.to_string(),
        message: format!("unexpected body: {e}"),
    })
}

/// Fail with `InvalidResponseShape` when the expected field path is absent.
pub(crate) fn require_field(
    provider: &str,
    value: Option<String>,
    field_path: &str,
) -> Result<String, RecognitionError> {
    value.ok_or_else(|| RecognitionError::InvalidResponseShape {
        provider: provider.to_string(),
        message: format!("missing {field_path}"),
    })
}

/// Build the normalized result for a successful call.
pub(crate) fn normalized_result(
    call: &RecognitionCall<'_>,
    confidence: f32,
    content: String,
) -> RecognitionResult {
    RecognitionResult {
        content,
        confidence,
        model: call.config.model.clone(),
        provider: call.config.provider_label(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}
