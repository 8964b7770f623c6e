//! Error types for Glimpse recognition.
//!
//! Recognition errors are classified by where they happen (image acquisition,
//! transport, provider response, configuration) so the retry executor can
//! decide what is worth another attempt and callers get actionable messages.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Glimpse operations.
#[derive(Error, Debug)]
pub enum GlimpseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Recognition errors
    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors produced while recognizing a single image with a single model.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// Image exceeds the configured payload ceiling. Never retried.
    #[error("Image too large: {size_bytes} bytes exceeds limit of {max_bytes} bytes")]
    ImageTooLarge { size_bytes: u64, max_bytes: u64 },

    /// Local image file does not exist.
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    /// Image could not be downloaded or read.
    #[error("Failed to download image from {source_ref}: {message}")]
    ImageDownloadFailed { source_ref: String, message: String },

    /// The image server answered with a non-success HTTP status.
    #[error("Failed to download image from {source_ref}: HTTP {status}")]
    ImageDownloadRejected { source_ref: String, status: u16 },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider} HTTP {status}: {body}")]
    ProviderHttp {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider answered 2xx but the body lacks the expected field path.
    #[error("Invalid {provider} response structure: {message}")]
    InvalidResponseShape { provider: String, message: String },

    /// Connection failure, DNS failure or timeout before a response arrived.
    #[error("{provider} request failed: {message}")]
    NetworkTransport { provider: String, message: String },

    /// The model configuration is unusable. Raised before any network call.
    #[error("Invalid model configuration: {0}")]
    ConfigurationInvalid(String),

    /// All attempts failed with retryable errors.
    #[error("Failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<RecognitionError>,
    },
}

impl RecognitionError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Only transport-class failures qualify. HTTP error responses are the
    /// provider's authoritative answer and are returned as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkTransport { .. } | Self::ImageDownloadFailed { .. }
        )
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            Self::ImageNotFound(_) => "IMAGE_NOT_FOUND",
            Self::ImageDownloadFailed { .. } | Self::ImageDownloadRejected { .. } => {
                "IMAGE_DOWNLOAD_FAILED"
            }
            Self::ProviderHttp { .. } => "PROVIDER_HTTP_ERROR",
            Self::InvalidResponseShape { .. } => "INVALID_PROVIDER_RESPONSE",
            Self::NetworkTransport { .. } => "NETWORK_ERROR",
            Self::ConfigurationInvalid(_) => "CONFIGURATION_INVALID",
            Self::RetriesExhausted { last, .. } => last.code(),
        }
    }

    /// The innermost error, unwrapping retry exhaustion.
    pub fn root(&self) -> &RecognitionError {
        match self {
            Self::RetriesExhausted { last, .. } => last.root(),
            other => other,
        }
    }
}

/// Convenience type alias for Glimpse results.
pub type Result<T> = std::result::Result<T, GlimpseError>;

/// Convenience type alias for recognition-specific results.
pub type RecognizeResult<T> = std::result::Result<T, RecognitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> RecognitionError {
        RecognitionError::NetworkTransport {
            provider: "openai".to_string(),
            message: "connection refused".to_string(),
        }
    }

    #[test]
    fn test_transport_errors_are_retryable() {
        assert!(transport().is_retryable());
        assert!(RecognitionError::ImageDownloadFailed {
            source_ref: "https://example.com/a.jpg".to_string(),
            message: "connection reset".to_string(),
        }
        .is_retryable());
    }

    #[test]
    fn test_http_errors_not_retryable() {
        for status in [400, 401, 429, 500, 503] {
            let err = RecognitionError::ProviderHttp {
                provider: "openai".to_string(),
                status,
                body: "nope".to_string(),
            };
            assert!(!err.is_retryable(), "status {status} must not retry");
        }
    }

    #[test]
    fn test_rejected_download_not_retryable() {
        let err = RecognitionError::ImageDownloadRejected {
            source_ref: "https://example.com/gone.jpg".to_string(),
            status: 404,
        };
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "IMAGE_DOWNLOAD_FAILED");
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_fatal_errors_not_retryable() {
        assert!(!RecognitionError::ImageTooLarge {
            size_bytes: 30,
            max_bytes: 20
        }
        .is_retryable());
        assert!(!RecognitionError::ConfigurationInvalid("x".into()).is_retryable());
        assert!(!RecognitionError::InvalidResponseShape {
            provider: "claude".into(),
            message: "missing content[0].text".into(),
        }
        .is_retryable());
    }

    #[test]
    fn test_exhausted_reports_last_failure() {
        let err = RecognitionError::RetriesExhausted {
            attempts: 3,
            last: Box::new(transport()),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("connection refused"));
        assert!(matches!(err.root(), RecognitionError::NetworkTransport { .. }));
    }
}
