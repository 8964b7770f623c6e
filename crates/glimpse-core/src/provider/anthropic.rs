//! Claude adapter using the Anthropic Messages API.
//!
//! Sends the prompt and a base64 image content block in a single user turn.

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

/// Messages API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude provider adapter.
pub struct ClaudeAdapter {
    client: reqwest::Client,
}

impl ClaudeAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image { source: ImageSource },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    text: Option<String>,
}

#[async_trait]
impl ProviderAdapter for ClaudeAdapter {
    fn name(&self) -> &str {
        "claude"
    }

    fn confidence(&self) -> f32 {
        ProviderKind::Claude.fixed_confidence()
    }

    async fn recognize(
        &self,
        call: &RecognitionCall<'_>,
    ) -> Result<RecognitionResult, RecognitionError> {
        let start = Instant::now();
        let url = format!("{}/messages", call.base_url);

        let body = MessagesRequest {
            model: call.config.model.clone(),
            max_tokens: call.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentBlock::Text {
                        text: call.prompt.to_string(),
                    },
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64".to_string(),
                            media_type: call.image.media_type.clone(),
                            data: call.image.data.clone(),
                        },
                    },
                ],
            }],
        };

        tracing::debug!("Sending Claude request for {}", call.config.model);
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", call.config.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(self.name(), e))?;

        let parsed: MessagesResponse = read_json(self.name(), resp).await?;
        let text = parsed.content.into_iter().next().and_then(|c| c.text);
        let text = require_field(self.name(), text, "content[0].text")?;

        tracing::debug!(
            "Claude answered in {}ms ({} chars)",
            start.elapsed().as_millis(),
            text.len()
        );
        Ok(normalized_result(call, self.confidence(), text))
    }
}
