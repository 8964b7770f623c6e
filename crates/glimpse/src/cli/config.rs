//! The `glimpse config` command for configuration management.

use clap::{Args, Subcommand};
use glimpse_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration (API keys stay as written)
    Show,

    /// Show config file path
    Path,

    /// Write a starter config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Starter model entries written by `config init`.
const STARTER_MODELS: &str = r#"
# Add one [[models]] entry per model you want to use. api_key accepts
# ${ENV_VAR} to read the key from the environment.
#
# [[models]]
# name = "gemini-flash"
# provider = "gemini"
# model = "gemini-1.5-flash"
# api_key = "${GEMINI_API_KEY}"
#
# [[models]]
# name = "local-llava"
# provider = "generic"
# model = "llava"
# api_key = "unused"
# api_url = "https://llm.internal.example.com/v1"
# is_custom = true
"#;

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            let toml = config.to_toml()?;
            println!("{toml}");
        }

        ConfigCommand::Path => {
            let path = Config::default_path();
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut toml = Config::default().to_toml()?;
            toml.push_str(STARTER_MODELS);
            std::fs::write(&path, toml)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}
