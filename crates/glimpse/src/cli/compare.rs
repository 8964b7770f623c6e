//! The `glimpse compare` command: one image, several models.

use super::shared::{image_ref, recognition_type};
use super::types::OutputFormat;
use anyhow::Context;
use clap::Args;
use glimpse_core::{
    ComparisonOptions, ComparisonOrchestrator, ComparisonStatus, Config, ModelConfig,
    OutputWriter, RecognitionDispatcher,
};
use std::time::Duration;

/// Arguments for the `compare` command.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Image URL, local path, or uploaded file id
    pub image: String,

    /// Configured model names to compare, in order (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub models: Vec<String>,

    /// Recognition type
    #[arg(short = 't', long = "type")]
    pub recognition_type: Option<String>,

    /// Custom prompt replacing the type's template
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Delay between model calls in milliseconds (default from config)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Output format for the report
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the compare command.
///
/// Ctrl-C pauses the run after the model currently in flight; the partial
/// report is still printed.
pub async fn execute(args: CompareArgs, config: &Config) -> anyhow::Result<()> {
    let models = select_models(config, &args.models)?;
    let image = image_ref(&args.image, config)?;
    let rtype = recognition_type(args.recognition_type.as_deref(), config);
    let options = ComparisonOptions {
        inter_call_delay: Duration::from_millis(
            args.delay_ms.unwrap_or(config.comparison.inter_call_delay_ms),
        ),
    };

    let orchestrator =
        ComparisonOrchestrator::new(RecognitionDispatcher::from_config(config), options);

    let control = orchestrator.control();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, pausing after the current model");
            control.pause();
        }
    });

    let progress = (!args.quiet).then(|| create_progress_bar(models.len() as u64));
    let report = orchestrator
        .run(&image, &models, rtype, args.prompt.as_deref(), |entry| {
            let Some(pb) = &progress else { return };
            match entry.status {
                ComparisonStatus::Processing => pb.set_message(entry.model_identifier.clone()),
                ComparisonStatus::Completed | ComparisonStatus::Error => pb.inc(1),
                ComparisonStatus::Pending => {}
            }
        })
        .await;
    ctrl_c.abort();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if let Some(stats) = &report.stats {
        tracing::info!(
            "{}/{} completed. Fastest: {}, most accurate: {}, recommended: {}",
            stats.completed_models,
            stats.total_models,
            stats.fastest_model,
            stats.most_accurate_model,
            stats.recommended_model
        );
    }

    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(stdout.lock(), args.format.into(), args.pretty);
    writer.write_report(&report)?;
    writer.flush()?;
    Ok(())
}

/// Model configs for the requested names, in the order given.
///
/// An entry whose key cannot be resolved is kept with an empty key so the
/// run records the failure on that model instead of aborting.
fn select_models(config: &Config, names: &[String]) -> anyhow::Result<Vec<ModelConfig>> {
    let entries: Vec<_> = if names.is_empty() {
        config.models.iter().collect()
    } else {
        names
            .iter()
            .map(|name| {
                config
                    .model(name)
                    .with_context(|| format!("No model named '{name}' in the config file"))
            })
            .collect::<anyhow::Result<_>>()?
    };

    if entries.is_empty() {
        anyhow::bail!("No models to compare. Add [[models]] entries to the config file.");
    }

    let models = entries
        .into_iter()
        .map(|entry| match entry.to_model_config() {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!("{e}");
                let mut model = ModelConfig::new(&entry.provider, &entry.model, "")
                    .with_api_url(&entry.api_url);
                model.is_custom = entry.is_custom;
                model
            }
        })
        .collect();
    Ok(models)
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb
}
