//! Core data types for Glimpse recognition and comparison runs.
//!
//! These types describe what a caller hands to the engine (model
//! configurations, image references, recognition requests) and what comes
//! back (normalized results, comparison entries, performance statistics).

use crate::error::RecognitionError;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// The closed set of providers the engine knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    DeepSeek,
    Claude,
    Zhipu,
    OpenRouter,
    /// Any other OpenAI-compatible endpoint.
    Generic,
}

/// Request/response schema family a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFamily {
    Gemini,
    OpenAiCompatible,
    Claude,
}

/// Model-name fragments used when the provider identifier is missing or
/// unknown. Checked in order; the first fragment found wins.
const MODEL_NAME_HINTS: &[(&str, ProviderKind)] = &[
    ("gemini", ProviderKind::Gemini),
    ("claude", ProviderKind::Claude),
    ("deepseek", ProviderKind::DeepSeek),
    ("glm", ProviderKind::Zhipu),
    ("gpt", ProviderKind::OpenAi),
];

impl ProviderKind {
    /// Every provider kind, in registry order.
    pub const ALL: [ProviderKind; 7] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAi,
        ProviderKind::DeepSeek,
        ProviderKind::Claude,
        ProviderKind::Zhipu,
        ProviderKind::OpenRouter,
        ProviderKind::Generic,
    ];

    /// Match an explicit provider identifier (case-insensitive).
    pub fn from_identifier(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAi),
            "deepseek" => Some(Self::DeepSeek),
            "claude" | "anthropic" => Some(Self::Claude),
            "zhipu" | "glm" => Some(Self::Zhipu),
            "openrouter" => Some(Self::OpenRouter),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }

    /// Infer a provider from a model name such as `gemini-1.5-pro` or `gpt-4o`.
    pub fn infer_from_model(model: &str) -> Option<Self> {
        let model = model.to_ascii_lowercase();
        MODEL_NAME_HINTS
            .iter()
            .find(|(fragment, _)| model.contains(fragment))
            .map(|(_, kind)| *kind)
    }

    /// Selection policy: explicit identifier, then model-name hint, then generic.
    pub fn resolve(config: &ModelConfig) -> Self {
        Self::from_identifier(&config.provider)
            .or_else(|| Self::infer_from_model(&config.model))
            .unwrap_or(Self::Generic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
            Self::Claude => "claude",
            Self::Zhipu => "zhipu",
            Self::OpenRouter => "openrouter",
            Self::Generic => "generic",
        }
    }

    /// Public API base URL used when a model config leaves `api_url` empty.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("https://generativelanguage.googleapis.com/v1beta"),
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::DeepSeek => Some("https://api.deepseek.com/v1"),
            Self::Claude => Some("https://api.anthropic.com/v1"),
            Self::Zhipu => Some("https://open.bigmodel.cn/api/paas/v4"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Self::Generic => None,
        }
    }

    pub fn family(&self) -> WireFamily {
        match self {
            Self::Gemini => WireFamily::Gemini,
            Self::Claude => WireFamily::Claude,
            _ => WireFamily::OpenAiCompatible,
        }
    }

    /// Confidence reported for every result from this provider.
    ///
    /// Providers do not return a usable confidence score for free-form
    /// recognition, so each adapter reports a fixed value.
    pub fn fixed_confidence(&self) -> f32 {
        match self {
            Self::Gemini => 0.95,
            Self::OpenAi => 0.92,
            Self::Claude => 0.93,
            Self::DeepSeek => 0.90,
            Self::Zhipu | Self::OpenRouter | Self::Generic => 0.85,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to call one model at one provider.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Provider identifier ("gemini", "openai", ...). May be empty or unknown.
    pub provider: String,

    /// Provider-side model name
    pub model: String,

    /// API key, never printed
    pub api_key: SecretString,

    /// API base URL; empty means the provider default
    pub api_url: String,

    /// User-defined model not in the built-in provider list
    pub is_custom: bool,
}

impl ModelConfig {
    pub fn new(provider: &str, model: &str, api_key: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            api_key: SecretString::from(api_key.to_string()),
            api_url: String::new(),
            is_custom: false,
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }

    /// Provider kind selected by the registry policy.
    pub fn kind(&self) -> ProviderKind {
        ProviderKind::resolve(self)
    }

    /// Provider label used in results and identifiers.
    ///
    /// The caller's identifier when given, otherwise the resolved kind.
    pub fn provider_label(&self) -> String {
        let provider = self.provider.trim();
        if provider.is_empty() {
            self.kind().as_str().to_string()
        } else {
            provider.to_ascii_lowercase()
        }
    }

    /// `provider::model`, the key used in comparison tables.
    pub fn identifier(&self) -> String {
        format!("{}::{}", self.provider_label(), self.model)
    }

    /// Validate the config and return the effective API base URL.
    ///
    /// HTTPS is required. Plain HTTP is only accepted for loopback hosts and
    /// only when `allow_insecure_loopback` is set (local development).
    pub fn validate(&self, allow_insecure_loopback: bool) -> Result<String, RecognitionError> {
        if self.model.trim().is_empty() {
            return Err(RecognitionError::ConfigurationInvalid(
                "model must not be empty".into(),
            ));
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(RecognitionError::ConfigurationInvalid(format!(
                "API key for {} must not be empty",
                self.identifier()
            )));
        }

        let explicit = self.api_url.trim().trim_end_matches('/');
        if self.is_custom && explicit.is_empty() {
            return Err(RecognitionError::ConfigurationInvalid(format!(
                "custom model {} requires an API URL",
                self.identifier()
            )));
        }
        let base = if explicit.is_empty() {
            self.kind().default_base_url().ok_or_else(|| {
                RecognitionError::ConfigurationInvalid(format!(
                    "no API URL configured for {}",
                    self.identifier()
                ))
            })?
        } else {
            explicit
        };

        let parsed = url::Url::parse(base).map_err(|e| {
            RecognitionError::ConfigurationInvalid(format!("invalid API URL '{base}': {e}"))
        })?;
        match parsed.scheme() {
            "https" => {}
            "http" if allow_insecure_loopback && is_loopback(&parsed) => {}
            "http" => {
                return Err(RecognitionError::ConfigurationInvalid(format!(
                    "API URL '{base}' must use HTTPS"
                )))
            }
            other => {
                return Err(RecognitionError::ConfigurationInvalid(format!(
                    "unsupported URL scheme '{other}' in '{base}'"
                )))
            }
        }

        Ok(base.to_string())
    }
}

fn is_loopback(url: &url::Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(url::Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

/// Where the image to recognize lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Remote image fetched over HTTP(S)
    Url(String),
    /// Image on the local filesystem
    Local(PathBuf),
}

impl ImageRef {
    /// Interpret a caller-supplied reference.
    ///
    /// `http://` and `https://` prefixes are URLs. An existing path is a local
    /// file. Anything else is an uploaded file id, resolved inside
    /// `upload_dir`.
    pub fn parse(input: &str, upload_dir: &Path) -> Result<Self, RecognitionError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RecognitionError::ConfigurationInvalid(
                "image reference must not be empty".into(),
            ));
        }
        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            url::Url::parse(input).map_err(|e| {
                RecognitionError::ConfigurationInvalid(format!("invalid image URL '{input}': {e}"))
            })?;
            return Ok(Self::Url(input.to_string()));
        }

        let path = Path::new(input);
        if path.exists() {
            return Ok(Self::Local(path.to_path_buf()));
        }
        Self::from_file_id(input, upload_dir)
    }

    /// Resolve an uploaded file id inside the upload directory.
    pub fn from_file_id(file_id: &str, upload_dir: &Path) -> Result<Self, RecognitionError> {
        let invalid = file_id.is_empty()
            || file_id.contains('/')
            || file_id.contains('\\')
            || file_id.contains("..");
        if invalid {
            return Err(RecognitionError::ConfigurationInvalid(format!(
                "invalid file id '{file_id}'"
            )));
        }
        Ok(Self::Local(upload_dir.join(file_id)))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Category of content to recognize. Selects the prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionType {
    #[default]
    Auto,
    Text,
    Handwriting,
    Receipt,
    Invoice,
    Document,
    Table,
    IdCard,
    BusinessCard,
    Math,
    Code,
    Ancient,
}

impl RecognitionType {
    pub const ALL: [RecognitionType; 12] = [
        Self::Auto,
        Self::Text,
        Self::Handwriting,
        Self::Receipt,
        Self::Invoice,
        Self::Document,
        Self::Table,
        Self::IdCard,
        Self::BusinessCard,
        Self::Math,
        Self::Code,
        Self::Ancient,
    ];

    /// Parse a type name; unknown names fall back to `Auto`.
    pub fn parse_lossy(value: &str) -> Self {
        let value = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .unwrap_or_else(|| {
                if !value.is_empty() {
                    tracing::debug!("Unknown recognition type '{value}', using auto");
                }
                Self::Auto
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Text => "text",
            Self::Handwriting => "handwriting",
            Self::Receipt => "receipt",
            Self::Invoice => "invoice",
            Self::Document => "document",
            Self::Table => "table",
            Self::IdCard => "id_card",
            Self::BusinessCard => "business_card",
            Self::Math => "math",
            Self::Code => "code",
            Self::Ancient => "ancient",
        }
    }
}

impl fmt::Display for RecognitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-model recognition request.
#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    pub image: ImageRef,
    pub model_config: ModelConfig,
    pub recognition_type: RecognitionType,
    /// Replaces the template prompt when non-empty
    pub prompt_override: Option<String>,
}

/// Normalized output of one provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Text returned by the provider, unmodified
    pub content: String,

    /// Fixed per-provider confidence in [0, 1]
    pub confidence: f32,

    /// Model name from the config
    pub model: String,

    /// Provider label
    pub provider: String,

    /// Completion time, RFC 3339 UTC
    pub timestamp: String,
}

/// Lifecycle of one model inside a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl ComparisonStatus {
    /// Allowed moves: pending → processing → completed | error.
    pub fn can_transition_to(self, next: ComparisonStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Error)
        )
    }
}

/// One row of a comparison table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// `provider::model`
    pub model_identifier: String,

    pub status: ComparisonStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Wall-clock dispatch duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RecognitionResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComparisonResult {
    pub fn pending(model_identifier: impl Into<String>) -> Self {
        Self {
            model_identifier: model_identifier.into(),
            status: ComparisonStatus::Pending,
            start_time: None,
            end_time: None,
            duration_ms: None,
            result: None,
            error: None,
        }
    }

    fn advance(&mut self, next: ComparisonStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            tracing::warn!(
                "Ignoring {:?} -> {:?} transition for {}",
                self.status,
                next,
                self.model_identifier
            );
            false
        }
    }

    pub fn mark_processing(&mut self, now: DateTime<Utc>) {
        if self.advance(ComparisonStatus::Processing) {
            self.start_time = Some(now);
        }
    }

    pub fn mark_completed(&mut self, result: RecognitionResult, now: DateTime<Utc>, duration_ms: u64) {
        if self.advance(ComparisonStatus::Completed) {
            self.result = Some(result);
            self.end_time = Some(now);
            self.duration_ms = Some(duration_ms);
        }
    }

    pub fn mark_error(&mut self, error: String, now: DateTime<Utc>, duration_ms: u64) {
        if self.advance(ComparisonStatus::Error) {
            self.error = Some(error);
            self.end_time = Some(now);
            self.duration_ms = Some(duration_ms);
        }
    }
}

/// Aggregate statistics over the completed entries of a comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_models: usize,
    pub completed_models: usize,
    pub average_duration_ms: f64,
    pub fastest_model: String,
    pub most_accurate_model: String,
    pub recommended_model: String,
}

/// JSON envelope for single-model recognition responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognition: Option<RecognitionResult>,

    /// Error code, e.g. `PROVIDER_HTTP_ERROR`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<RecognitionResult, RecognitionError>> for RecognitionResponse {
    fn from(outcome: Result<RecognitionResult, RecognitionError>) -> Self {
        match outcome {
            Ok(recognition) => Self {
                success: true,
                recognition: Some(recognition),
                error: None,
                message: None,
            },
            Err(e) => Self {
                success: false,
                recognition: None,
                error: Some(e.code().to_string()),
                message: Some(e.to_string()),
            },
        }
    }
}
