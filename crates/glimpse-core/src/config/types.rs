//! Sub-configuration structs with their defaults.

use crate::error::ConfigError;
use crate::types::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where uploaded images are stored, keyed by file id
    pub upload_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("~/.glimpse/uploads"),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image payload in megabytes
    pub max_image_size_mb: u64,

    /// Timeout for a single provider or download attempt in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_size_mb: 20,
            request_timeout_ms: 30_000,
        }
    }
}

impl LimitsConfig {
    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Retry settings for transport failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    pub max_attempts: u32,

    /// Linear backoff unit in milliseconds (attempt n waits n × this)
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// Comparison run pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Fixed pause between consecutive model dispatches in milliseconds
    pub inter_call_delay_ms: u64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            inter_call_delay_ms: 1000,
        }
    }
}

/// Batch recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Images recognized concurrently per wave
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 3 }
    }
}

/// Recognition defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Recognition type used when none is given
    pub default_type: String,

    /// Completion token budget sent to providers
    pub max_tokens: u32,

    /// Accept plain-HTTP API URLs on loopback hosts (local development)
    pub allow_insecure_loopback: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            default_type: "auto".to_string(),
            max_tokens: 2000,
            allow_insecure_loopback: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// A named model entry in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Unique name used on the command line
    pub name: String,

    /// Provider identifier ("gemini", "openai", "claude", ...)
    #[serde(default)]
    pub provider: String,

    /// Provider-side model name
    pub model: String,

    /// API key (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub api_key: String,

    /// API base URL; empty uses the provider default
    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub is_custom: bool,
}

impl ModelEntry {
    /// Resolve the API key and build a dispatchable model config.
    pub fn to_model_config(&self) -> Result<ModelConfig, ConfigError> {
        let api_key = resolve_env_var(&self.api_key).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "API key for model '{}' is not set ({})",
                self.name,
                if self.api_key.is_empty() {
                    "empty"
                } else {
                    self.api_key.as_str()
                }
            ))
        })?;

        let mut config = ModelConfig::new(&self.provider, &self.model, &api_key)
            .with_api_url(&self.api_url);
        config.is_custom = self.is_custom;
        Ok(config)
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
