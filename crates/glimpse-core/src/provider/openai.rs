//! OpenAI-compatible adapter using the Chat Completions API.
//!
//! OpenAI, DeepSeek, OpenRouter, Zhipu and any unknown provider share this
//! schema; only the base URL and reported confidence differ. The image is
//! sent as a base64 data URL in the user message content array.

use super::adapter::{
    normalized_result, read_json, require_field, transport_error, ProviderAdapter,
    RecognitionCall,
};
use crate::error::RecognitionError;
use crate::types::{ProviderKind, RecognitionResult};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Chat Completions adapter for one OpenAI-compatible provider kind.
pub struct OpenAiCompatibleAdapter {
    kind: ProviderKind,
    client: reqwest::Client,
}

impl OpenAiCompatibleAdapter {
    pub fn new(kind: ProviderKind, client: reqwest::Client) -> Self {
        Self { kind, client }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn confidence(&self) -> f32 {
        self.kind.fixed_confidence()
    }

    async fn recognize(
        &self,
        call: &RecognitionCall<'_>,
    ) -> Result<RecognitionResult, RecognitionError> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", call.base_url);

        let body = ChatRequest {
            model: call.config.model.clone(),
            max_tokens: call.max_tokens,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: call.prompt.to_string(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: call.image.data_url(),
                        },
                    },
                ],
            }],
        };

        tracing::debug!("Sending {} request for {}", self.name(), call.config.model);
        let resp = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", call.config.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(self.name(), e))?;

        let parsed: ChatResponse = read_json(self.name(), resp).await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);
        let text = require_field(self.name(), text, "choices[0].message.content")?;

        tracing::debug!(
            "{} answered in {}ms ({} chars)",
            self.name(),
            start.elapsed().as_millis(),
            text.len()
        );
        Ok(normalized_result(call, self.confidence(), text))
    }
}
