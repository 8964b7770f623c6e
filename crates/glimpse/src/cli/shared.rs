//! Arguments and helpers shared by `recognize`, `compare` and `batch`.

use anyhow::Context;
use clap::Args;
use glimpse_core::{Config, ImageRef, ModelConfig, RecognitionError, RecognitionType};

/// Selects the model for single-model commands.
///
/// Either names a `[[models]]` entry from the config file or describes the
/// model inline. With neither, the first configured model is used.
#[derive(Args, Debug, Default)]
pub struct ModelArgs {
    /// Name of a model entry in the config file
    #[arg(long, conflicts_with_all = ["provider", "model", "api_url"])]
    pub model_name: Option<String>,

    /// Provider identifier (gemini, openai, claude, deepseek, zhipu, openrouter, ...)
    #[arg(long)]
    pub provider: Option<String>,

    /// Provider-side model name
    #[arg(long)]
    pub model: Option<String>,

    /// API key for an inline model
    #[arg(long, env = "GLIMPSE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL; defaults to the provider's public endpoint
    #[arg(long)]
    pub api_url: Option<String>,

    /// Treat the inline model as custom (requires --api-url)
    #[arg(long)]
    pub custom: bool,
}

impl ModelArgs {
    pub fn resolve(&self, config: &Config) -> anyhow::Result<ModelConfig> {
        if let Some(name) = &self.model_name {
            let entry = config
                .model(name)
                .with_context(|| format!("No model named '{name}' in the config file"))?;
            return Ok(entry.to_model_config()?);
        }

        if let Some(model) = &self.model {
            let mut model_config = ModelConfig::new(
                self.provider.as_deref().unwrap_or_default(),
                model,
                self.api_key.as_deref().unwrap_or_default(),
            );
            if let Some(url) = &self.api_url {
                model_config = model_config.with_api_url(url);
            }
            if self.custom {
                model_config = model_config.custom();
            }
            return Ok(model_config);
        }

        let entry = config.models.first().context(
            "No model selected. Pass --model-name or --model, or add a [[models]] entry to the config",
        )?;
        tracing::debug!("Using first configured model '{}'", entry.name);
        Ok(entry.to_model_config()?)
    }
}

/// Resolve `--type`, falling back to the configured default.
pub fn recognition_type(arg: Option<&str>, config: &Config) -> RecognitionType {
    arg.map(RecognitionType::parse_lossy)
        .unwrap_or_else(|| config.default_recognition_type())
}

/// Interpret an image argument as a URL, a local path or an upload id.
pub fn image_ref(input: &str, config: &Config) -> Result<ImageRef, RecognitionError> {
    ImageRef::parse(input, &config.upload_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimpse_core::ProviderKind;

    const CONFIG: &str = r#"
[[models]]
name = "fast"
provider = "gemini"
model = "gemini-1.5-flash"
api_key = "g-key"

[[models]]
name = "careful"
provider = "claude"
model = "claude-3-5-sonnet"
api_key = "c-key"
"#;

    #[test]
    fn test_named_model_from_config() {
        let config = Config::from_toml(CONFIG).unwrap();
        let args = ModelArgs {
            model_name: Some("careful".to_string()),
            ..Default::default()
        };
        let model = args.resolve(&config).unwrap();
        assert_eq!(model.kind(), ProviderKind::Claude);
        assert_eq!(model.model, "claude-3-5-sonnet");
    }

    #[test]
    fn test_unknown_model_name_is_error() {
        let config = Config::from_toml(CONFIG).unwrap();
        let args = ModelArgs {
            model_name: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(args.resolve(&config).is_err());
    }

    #[test]
    fn test_inline_model() {
        let args = ModelArgs {
            provider: Some("openai".to_string()),
            model: Some("gpt-4o".to_string()),
            api_key: Some("sk".to_string()),
            api_url: Some("https://proxy.example.com/v1".to_string()),
            ..Default::default()
        };
        let model = args.resolve(&Config::default()).unwrap();
        assert_eq!(model.identifier(), "openai::gpt-4o");
        assert_eq!(model.api_url, "https://proxy.example.com/v1");
    }

    #[test]
    fn test_first_configured_model_is_default() {
        let config = Config::from_toml(CONFIG).unwrap();
        let model = ModelArgs::default().resolve(&config).unwrap();
        assert_eq!(model.kind(), ProviderKind::Gemini);
    }

    #[test]
    fn test_no_model_anywhere_is_error() {
        assert!(ModelArgs::default().resolve(&Config::default()).is_err());
    }

    #[test]
    fn test_recognition_type_fallbacks() {
        let config = Config::default();
        assert_eq!(recognition_type(Some("receipt"), &config), RecognitionType::Receipt);
        assert_eq!(recognition_type(Some("hieroglyphs"), &config), RecognitionType::Auto);
        assert_eq!(recognition_type(None, &config), RecognitionType::Auto);
    }
}
