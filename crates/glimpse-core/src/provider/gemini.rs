//! Gemini adapter using the `generateContent` API.
//!
//! The API key travels as a `key` query parameter and the image as an
//! `inlineData` part next to the prompt.

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

/// Gemini provider adapter.
pub struct GeminiAdapter {
    client: reqwest::Client,
}

impl GeminiAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    fn confidence(&self) -> f32 {
        ProviderKind::Gemini.fixed_confidence()
    }

    async fn recognize(
        &self,
        call: &RecognitionCall<'_>,
    ) -> Result<RecognitionResult, RecognitionError> {
        let start = Instant::now();
        let url = format!(
            "{}/models/{}:generateContent",
            call.base_url, call.config.model
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: call.prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: call.image.media_type.clone(),
                            data: call.image.data.clone(),
                        },
                    },
                ],
            }],
        };

        tracing::debug!("Sending Gemini request for {}", call.config.model);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", call.config.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(self.name(), e))?;

        let parsed: GenerateResponse = read_json(self.name(), resp).await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text);
        let text = require_field(self.name(), text, "candidates[0].content.parts[0].text")?;

        tracing::debug!(
            "Gemini answered in {}ms ({} chars)",
            start.elapsed().as_millis(),
            text.len()
        );
        Ok(normalized_result(call, self.confidence(), text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageInput;
    use crate::types::ModelConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn image() -> ImageInput {
        ImageInput::from_bytes(&[1, 2, 3], "image/png")
    }

    async fn call_adapter(server: &MockServer) -> Result<RecognitionResult, RecognitionError> {
        let config = ModelConfig::new("gemini", "gemini-1.5-flash", "g-key");
        let image = image();
        let base_url = server.uri();
        let call = RecognitionCall {
            image: &image,
            prompt: "Read it",
            config: &config,
            base_url: &base_url,
            max_tokens: 100,
        };
        GeminiAdapter::new(reqwest::Client::new())
            .recognize(&call)
            .await
    }

    #[tokio::test]
    async fn test_gemini_wire_shape_and_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "g-key"))
            .and(body_partial_json(json!({
                "contents": [{
                    "parts": [
                        {"text": "Read it"},
                        {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "Hello from Gemini"}], "role": "model"},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = call_adapter(&server).await.unwrap();
        assert_eq!(result.content, "Hello from Gemini");
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.model, "gemini-1.5-flash");
        assert_eq!(result.provider, "gemini");
    }

    #[tokio::test]
    async fn test_gemini_missing_candidates_is_shape_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = call_adapter(&server).await.unwrap_err();
        assert!(matches!(err, RecognitionError::InvalidResponseShape { .. }));
        assert!(err.to_string().contains("candidates[0].content.parts[0].text"));
    }

    #[tokio::test]
    async fn test_gemini_http_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        match call_adapter(&server).await.unwrap_err() {
            RecognitionError::ProviderHttp {
                provider,
                status,
                body,
            } => {
                assert_eq!(provider, "gemini");
                assert_eq!(status, 400);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("Expected ProviderHttp, got {other:?}"),
        }
    }
}
