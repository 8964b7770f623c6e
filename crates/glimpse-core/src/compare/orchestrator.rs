//! Sequential multi-model comparison.
//!
//! Models are dispatched one at a time in caller order, paced by a fixed
//! delay between calls. Every state change of an entry is reported through
//! the update callback so callers can render progress as it happens.

use super::scoring::compute_stats;
use crate::dispatch::RecognitionDispatcher;
use crate::error::RecognitionError;
use crate::image::ImageInput;
use crate::types::{
    ComparisonResult, ImageRef, ModelConfig, PerformanceStats, RecognitionType,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Pacing for a comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonOptions {
    /// Pause between consecutive dispatches
    pub inter_call_delay: Duration,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            inter_call_delay: Duration::from_millis(1000),
        }
    }
}

/// Lifecycle of a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Cloneable handle for pausing a run from another task.
///
/// Pausing is cooperative: the flag is read before each dispatch, so a call
/// already in flight always finishes.
#[derive(Debug, Clone)]
pub struct RunControl {
    paused: Arc<AtomicBool>,
    state: Arc<Mutex<RunState>>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self {
            paused: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(RunState::Idle)),
        }
    }
}

impl RunControl {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> RunState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: RunState) {
        match self.state.lock() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    fn reset(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.set_state(RunState::Running);
    }
}

/// Outcome of a comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// One entry per model, in caller order
    pub results: Vec<ComparisonResult>,
    /// Absent when no model completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PerformanceStats>,
    /// True when the run stopped early; unreached entries stay pending
    pub paused: bool,
}

/// Runs one image against several models.
#[derive(Debug, Clone)]
pub struct ComparisonOrchestrator {
    dispatcher: RecognitionDispatcher,
    options: ComparisonOptions,
    control: RunControl,
}

impl ComparisonOrchestrator {
    pub fn new(dispatcher: RecognitionDispatcher, options: ComparisonOptions) -> Self {
        Self {
            dispatcher,
            options,
            control: RunControl::default(),
        }
    }

    /// Handle for pausing runs of this orchestrator.
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    /// Compare `models` on `image`.
    ///
    /// Starts from scratch on every call and clears any earlier pause.
    /// A failing model is recorded on its entry and never stops the run.
    pub async fn run<F>(
        &self,
        image: &ImageRef,
        models: &[ModelConfig],
        recognition_type: RecognitionType,
        prompt_override: Option<&str>,
        mut on_update: F,
    ) -> ComparisonReport
    where
        F: FnMut(&ComparisonResult),
    {
        self.control.reset();
        let mut results: Vec<ComparisonResult> = models
            .iter()
            .map(|m| ComparisonResult::pending(m.identifier()))
            .collect();
        let mut cached: Option<ImageInput> = None;
        let mut paused = false;

        tracing::info!(
            "Comparing {} models on {image} ({recognition_type})",
            models.len()
        );

        for (index, config) in models.iter().enumerate() {
            if self.control.is_paused() {
                tracing::info!(
                    "Comparison paused with {} of {} models remaining",
                    models.len() - index,
                    models.len()
                );
                paused = true;
                break;
            }

            let entry = &mut results[index];
            entry.mark_processing(Utc::now());
            on_update(entry);

            // Only the provider call is timed, not the shared image acquisition.
            let (outcome, duration_ms) = match self.prepare(image, &mut cached, config).await {
                Ok(input) => {
                    let start = Instant::now();
                    let outcome = self
                        .dispatcher
                        .recognize_image(input, config, recognition_type, prompt_override)
                        .await;
                    (outcome, start.elapsed().as_millis() as u64)
                }
                Err(e) => (Err(e), 0),
            };

            match outcome {
                Ok(result) => {
                    tracing::info!("{} completed in {duration_ms}ms", entry.model_identifier);
                    entry.mark_completed(result, Utc::now(), duration_ms);
                }
                Err(e) => {
                    tracing::info!("{} failed: {e}", entry.model_identifier);
                    entry.mark_error(e.to_string(), Utc::now(), duration_ms);
                }
            }
            on_update(entry);

            if index + 1 < models.len()
                && !self.options.inter_call_delay.is_zero()
                && !self.control.is_paused()
            {
                tokio::time::sleep(self.options.inter_call_delay).await;
            }
        }

        self.control.set_state(if paused {
            RunState::Paused
        } else {
            RunState::Finished
        });

        let stats = compute_stats(&results);
        ComparisonReport {
            results,
            stats,
            paused,
        }
    }

    /// Validate the model, then acquire the image on first use and cache it.
    async fn prepare<'c>(
        &self,
        image: &ImageRef,
        cached: &'c mut Option<ImageInput>,
        config: &ModelConfig,
    ) -> Result<&'c ImageInput, RecognitionError> {
        self.dispatcher.check(config)?;

        let input = match cached.take() {
            Some(input) => input,
            None => self.dispatcher.acquire(image).await?,
        };
        Ok(cached.insert(input))
    }
}
