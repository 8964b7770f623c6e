//! Multi-model comparison and batch recognition.

pub mod batch;
pub mod orchestrator;
pub mod scoring;

pub use batch::{run_in_waves, BatchItem, BatchRecognizer, DEFAULT_WAVE_SIZE};
pub use orchestrator::{
    ComparisonOptions, ComparisonOrchestrator, ComparisonReport, RunControl, RunState,
};
pub use scoring::compute_stats;
