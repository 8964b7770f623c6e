//! Registry mapping provider kinds to adapters.
//!
//! Selection is two-step: the model config resolves to a `ProviderKind`
//! (explicit identifier, then model-name hint, then generic), and the kind is
//! looked up in the map. Kinds without a registered adapter fall back to the
//! generic OpenAI-compatible entry.

use super::adapter::ProviderAdapter;
use super::anthropic::ClaudeAdapter;
use super::gemini::GeminiAdapter;
use super::openai::OpenAiCompatibleAdapter;
use crate::error::RecognitionError;
use crate::types::{ModelConfig, ProviderKind, WireFamily};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps provider kinds to adapter instances.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    /// Registry with no adapters; callers register their own.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in adapter for every provider kind.
    pub fn with_builtin(client: reqwest::Client) -> Self {
        let mut registry = Self::empty();
        for kind in ProviderKind::ALL {
            let adapter: Arc<dyn ProviderAdapter> = match kind.family() {
                WireFamily::Gemini => Arc::new(GeminiAdapter::new(client.clone())),
                WireFamily::Claude => Arc::new(ClaudeAdapter::new(client.clone())),
                WireFamily::OpenAiCompatible => {
                    Arc::new(OpenAiCompatibleAdapter::new(kind, client.clone()))
                }
            };
            registry.register(kind, adapter);
        }
        registry
    }

    /// Register (or replace) the adapter for a provider kind.
    pub fn register(&mut self, kind: ProviderKind, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(kind, adapter);
    }

    /// Adapter for a provider kind, falling back to the generic entry.
    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn ProviderAdapter>, RecognitionError> {
        self.adapters
            .get(&kind)
            .or_else(|| self.adapters.get(&ProviderKind::Generic))
            .cloned()
            .ok_or_else(|| {
                RecognitionError::ConfigurationInvalid(format!(
                    "no adapter registered for provider '{kind}'"
                ))
            })
    }

    /// Adapter for a model config.
    pub fn resolve(
        &self,
        config: &ModelConfig,
    ) -> Result<Arc<dyn ProviderAdapter>, RecognitionError> {
        let kind = config.kind();
        let adapter = self.get(kind)?;
        tracing::debug!(
            "Resolved {} to {} adapter",
            config.identifier(),
            adapter.name()
        );
        Ok(adapter)
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.adapters.keys().map(ProviderKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("AdapterRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::ScriptedAdapter;

    fn builtin() -> AdapterRegistry {
        AdapterRegistry::with_builtin(reqwest::Client::new())
    }

    #[test]
    fn test_explicit_provider_selects_adapter() {
        let registry = builtin();
        let cases = [
            ("gemini", "anything", "gemini", 0.95),
            ("openai", "anything", "openai", 0.92),
            ("claude", "anything", "claude", 0.93),
            ("deepseek", "anything", "deepseek", 0.90),
            ("zhipu", "anything", "zhipu", 0.85),
            ("glm", "anything", "zhipu", 0.85),
            ("openrouter", "anything", "openrouter", 0.85),
        ];
        for (provider, model, name, confidence) in cases {
            let adapter = registry
                .resolve(&ModelConfig::new(provider, model, "k"))
                .unwrap();
            assert_eq!(adapter.name(), name, "provider {provider}");
            assert_eq!(adapter.confidence(), confidence, "provider {provider}");
        }
    }

    #[test]
    fn test_explicit_provider_beats_model_substring() {
        let adapter = builtin()
            .resolve(&ModelConfig::new("openrouter", "google/gemini-pro-vision", "k"))
            .unwrap();
        assert_eq!(adapter.name(), "openrouter");
    }

    #[test]
    fn test_model_substring_when_provider_unknown() {
        let registry = builtin();
        let adapter = registry
            .resolve(&ModelConfig::new("custom", "gemini-2.0-flash", "k"))
            .unwrap();
        assert_eq!(adapter.name(), "gemini");
        let adapter = registry
            .resolve(&ModelConfig::new("", "gpt-4o-mini", "k"))
            .unwrap();
        assert_eq!(adapter.name(), "openai");
    }

    #[test]
    fn test_unknown_falls_back_to_generic() {
        let adapter = builtin()
            .resolve(&ModelConfig::new("siliconflow", "qwen2-vl-72b", "k"))
            .unwrap();
        assert_eq!(adapter.name(), "generic");
        assert_eq!(adapter.confidence(), 0.85);
    }

    #[test]
    fn test_missing_kind_uses_generic_entry() {
        let mut registry = AdapterRegistry::empty();
        registry.register(ProviderKind::Generic, Arc::new(ScriptedAdapter::new("fallback")));
        let adapter = registry
            .resolve(&ModelConfig::new("claude", "claude-3", "k"))
            .unwrap();
        assert_eq!(adapter.name(), "fallback");
    }

    #[test]
    fn test_empty_registry_is_configuration_error() {
        let result = AdapterRegistry::empty().resolve(&ModelConfig::new("openai", "gpt-4o", "k"));
        match result {
            Err(err) => assert!(matches!(err, RecognitionError::ConfigurationInvalid(_))),
            Ok(adapter) => panic!("Expected ConfigurationInvalid, got {} adapter", adapter.name()),
        }
    }
}
