//! Configuration validation with range checks.

use crate::error::ConfigError;
use std::collections::HashSet;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_image_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_size_mb must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be > 0".into(),
            ));
        }
        if self.batch.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "batch.concurrency must be > 0".into(),
            ));
        }
        if self.recognition.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "recognition.max_tokens must be > 0".into(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.models {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "models[].name must not be empty".into(),
                ));
            }
            if entry.model.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "models[{}].model must not be empty",
                    entry.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate model name '{}'",
                    entry.name
                )));
            }
        }
        Ok(())
    }
}
