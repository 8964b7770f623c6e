//! Wave-based batch recognition.
//!
//! Work runs in fixed-size groups: every item of a wave is started together
//! and the next wave starts only once the whole group has settled. Results
//! come back in input order regardless of completion order.

use crate::dispatch::RecognitionDispatcher;
use crate::types::{ImageRef, ModelConfig, RecognitionRequest, RecognitionResponse, RecognitionType};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Default number of items per wave.
pub const DEFAULT_WAVE_SIZE: usize = 3;

/// Run `f` over `items` in waves of `wave_size`.
///
/// A wave size of zero is treated as one.
pub async fn run_in_waves<T, R, F, Fut>(items: Vec<T>, wave_size: usize, mut f: F) -> Vec<R>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    let wave_size = wave_size.max(1);
    let total_waves = items.len().div_ceil(wave_size);
    let mut outputs = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter().peekable();
    let mut wave = 0;

    while remaining.peek().is_some() {
        wave += 1;
        let futures: Vec<Fut> = remaining.by_ref().take(wave_size).map(&mut f).collect();
        tracing::debug!("Starting wave {wave}/{total_waves} ({} items)", futures.len());
        outputs.extend(join_all(futures).await);
    }

    outputs
}

/// Outcome for one image of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Position in the input list
    pub index: usize,
    pub image: String,
    #[serde(flatten)]
    pub response: RecognitionResponse,
}

/// Recognizes many images with one model, a wave at a time.
#[derive(Debug, Clone)]
pub struct BatchRecognizer {
    dispatcher: RecognitionDispatcher,
    wave_size: usize,
}

impl BatchRecognizer {
    pub fn new(dispatcher: RecognitionDispatcher, wave_size: usize) -> Self {
        Self {
            dispatcher,
            wave_size,
        }
    }

    pub async fn recognize_all(
        &self,
        images: Vec<ImageRef>,
        config: &ModelConfig,
        recognition_type: RecognitionType,
        prompt_override: Option<&str>,
    ) -> Vec<BatchItem> {
        let total = images.len();
        tracing::info!(
            "Batch of {total} images with {} (waves of {})",
            config.identifier(),
            self.wave_size.max(1)
        );

        let items = run_in_waves(
            images.into_iter().enumerate().collect(),
            self.wave_size,
            |(index, image)| async move {
                let request = RecognitionRequest {
                    image,
                    model_config: config.clone(),
                    recognition_type,
                    prompt_override: prompt_override.map(str::to_string),
                };
                let outcome = self.dispatcher.recognize(&request).await;
                BatchItem {
                    index,
                    image: request.image.to_string(),
                    response: outcome.into(),
                }
            },
        )
        .await;

        let succeeded = items.iter().filter(|i| i.response.success).count();
        tracing::info!("Batch finished: {succeeded}/{total} succeeded");
        items
    }
}
