//! The `glimpse batch` command: many images, one model.

use super::shared::{image_ref, recognition_type, ModelArgs};
use clap::Args;
use glimpse_core::{
    BatchItem, BatchRecognizer, Config, OutputFormat, OutputWriter, RecognitionDispatcher,
    RecognitionResponse, RecognitionResult,
};

/// Arguments for the `batch` command.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Image URLs, local paths, or uploaded file ids
    #[arg(required = true)]
    pub images: Vec<String>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Recognition type applied to every image
    #[arg(short = 't', long = "type")]
    pub recognition_type: Option<String>,

    /// Custom prompt replacing the type's template
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Images recognized together per wave (default from config)
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,
}

/// Execute the batch command, printing one JSONL line per image in input order.
pub async fn execute(args: BatchArgs, config: &Config) -> anyhow::Result<()> {
    let model_config = args.model.resolve(config)?;
    let rtype = recognition_type(args.recognition_type.as_deref(), config);
    let wave_size = args.concurrency.unwrap_or(config.batch.concurrency);

    // References that fail to parse are reported in place; the rest run.
    let mut parsed = Vec::new();
    let mut rejected = Vec::new();
    for (index, input) in args.images.iter().enumerate() {
        match image_ref(input, config) {
            Ok(image) => parsed.push((index, image)),
            Err(e) => rejected.push(BatchItem {
                index,
                image: input.clone(),
                response: RecognitionResponse::from(Err::<RecognitionResult, _>(e)),
            }),
        }
    }

    let (indices, images): (Vec<usize>, Vec<_>) = parsed.into_iter().unzip();
    let recognizer = BatchRecognizer::new(RecognitionDispatcher::from_config(config), wave_size);
    let mut items = recognizer
        .recognize_all(images, &model_config, rtype, args.prompt.as_deref())
        .await;
    for (item, index) in items.iter_mut().zip(indices) {
        item.index = index;
    }
    items.extend(rejected);
    items.sort_by_key(|item| item.index);

    let failed = items.iter().filter(|i| !i.response.success).count();
    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(stdout.lock(), OutputFormat::JsonLines, false);
    for item in &items {
        writer.write(item)?;
    }
    writer.flush()?;

    if failed > 0 {
        tracing::warn!("{failed} of {} images failed", items.len());
    }
    Ok(())
}
