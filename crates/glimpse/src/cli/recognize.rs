//! The `glimpse recognize` command for single-model recognition.

use super::shared::{image_ref, recognition_type, ModelArgs};
use clap::Args;
use glimpse_core::{
    Config, OutputFormat, OutputWriter, RecognitionDispatcher, RecognitionRequest,
    RecognitionResponse,
};

/// Arguments for the `recognize` command.
#[derive(Args, Debug)]
pub struct RecognizeArgs {
    /// Image URL, local path, or uploaded file id
    pub image: String,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Recognition type (auto, text, handwriting, receipt, invoice, document,
    /// table, id_card, business_card, math, code, ancient)
    #[arg(short = 't', long = "type")]
    pub recognition_type: Option<String>,

    /// Custom prompt replacing the type's template
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Pretty-print the JSON envelope
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the recognize command.
///
/// Failures are still printed as an envelope; the exit status reflects
/// success.
pub async fn execute(args: RecognizeArgs, config: &Config) -> anyhow::Result<()> {
    let model_config = args.model.resolve(config)?;
    let outcome = match image_ref(&args.image, config) {
        Ok(image) => {
            let request = RecognitionRequest {
                image,
                model_config,
                recognition_type: recognition_type(args.recognition_type.as_deref(), config),
                prompt_override: args.prompt,
            };
            RecognitionDispatcher::from_config(config)
                .recognize(&request)
                .await
        }
        Err(e) => Err(e),
    };

    let response = RecognitionResponse::from(outcome);
    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(stdout.lock(), OutputFormat::Json, args.pretty);
    writer.write(&response)?;
    writer.flush()?;

    if !response.success {
        anyhow::bail!(
            "Recognition failed: {}",
            response.message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
