//! Scripted provider adapter for tests.
//!
//! Each model name can be given a delay, a confidence and a sequence of
//! replies; call `n` for a model uses reply `n` (the last reply repeats).

use super::adapter::{ProviderAdapter, RecognitionCall};
use crate::error::RecognitionError;
use crate::types::RecognitionResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Text(String),
    Http(u16),
    Transport,
    Shape,
}

#[derive(Debug, Clone)]
pub(crate) struct Script {
    pub delay: Duration,
    pub confidence: Option<f32>,
    pub replies: Vec<Reply>,
}

impl Script {
    pub fn text(content: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            confidence: None,
            replies: vec![Reply::Text(content.to_string())],
        }
    }

    pub fn replies(replies: Vec<Reply>) -> Self {
        Self {
            delay: Duration::ZERO,
            confidence: None,
            replies,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Shared view of what the adapter saw, usable after it moves into a registry.
#[derive(Clone, Default)]
pub(crate) struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicU32>,
    max_in_flight: Arc<AtomicU32>,
}

impl CallLog {
    /// Model names in call order.
    pub fn models(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Prompts in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub(crate) struct ScriptedAdapter {
    name: String,
    confidence: f32,
    scripts: HashMap<String, Script>,
    log: CallLog,
}

impl ScriptedAdapter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            confidence: 0.9,
            scripts: HashMap::new(),
            log: CallLog::default(),
        }
    }

    pub fn script(mut self, model: &str, script: Script) -> Self {
        self.scripts.insert(model.to_string(), script);
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }

    async fn recognize(
        &self,
        call: &RecognitionCall<'_>,
    ) -> Result<RecognitionResult, RecognitionError> {
        let model = call.config.model.clone();
        let index = {
            let mut calls = self.log.calls.lock().unwrap();
            let index = calls.iter().filter(|m| **m == model).count();
            calls.push(model.clone());
            index
        };
        self.log.prompts.lock().unwrap().push(call.prompt.to_string());
        let current = self.log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let script = self
            .scripts
            .get(&model)
            .cloned()
            .unwrap_or_else(|| Script::text(&format!("text from {model}")));
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        self.log.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = script
            .replies
            .get(index)
            .or_else(|| script.replies.last())
            .cloned()
            .unwrap_or(Reply::Shape);
        match reply {
            Reply::Text(content) => Ok(RecognitionResult {
                content,
                confidence: script.confidence.unwrap_or(self.confidence),
                model,
                provider: call.config.provider_label(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }),
            Reply::Http(status) => Err(RecognitionError::ProviderHttp {
                provider: self.name.clone(),
                status,
                body: format!("scripted {status}"),
            }),
            Reply::Transport => Err(RecognitionError::NetworkTransport {
                provider: self.name.clone(),
                message: "scripted connection reset".to_string(),
            }),
            Reply::Shape => Err(RecognitionError::InvalidResponseShape {
                provider: self.name.clone(),
                message: "scripted missing field".to_string(),
            }),
        }
    }
}

/// A tiny PNG-looking file on disk.
pub(crate) fn temp_png() -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
        .unwrap();
    file
}

/// Dispatcher serving every OpenAI-kind model with `adapter`.
///
/// Local images are capped at 1 KiB.
pub(crate) fn scripted_dispatcher(
    adapter: ScriptedAdapter,
) -> (crate::dispatch::RecognitionDispatcher, CallLog) {
    use crate::dispatch::{DispatchOptions, RecognitionDispatcher};
    use crate::image::ImageAcquirer;
    use crate::provider::AdapterRegistry;
    use crate::types::ProviderKind;

    let log = adapter.log();
    let mut registry = AdapterRegistry::empty();
    registry.register(ProviderKind::OpenAi, Arc::new(adapter));
    let acquirer = ImageAcquirer::new(reqwest::Client::new(), 1024);
    (
        RecognitionDispatcher::new(registry, acquirer, DispatchOptions::default()),
        log,
    )
}
