//! Google Gemini `generateContent` client.

use super::{InferenceError, InlineImage, VisionModel};
use crate::config::ModelSettings;
use crate::error::Result;
use crate::http::create_client_with_timeout;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Error status Gemini reports alongside HTTP 429.
const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

/// Gemini API client for multimodal summaries.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: Blob<'a> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiClient {
    /// Create a client for `model` against `base_url`.
    pub fn new(api_key: &str, model: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(timeout)?,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from model settings, reading the API key from the environment.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let api_key = settings.api_key()?;
        Self::new(&api_key, &settings.model, &settings.base_url, settings.timeout())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model, images = images.len()))]
    async fn generate(
        &self,
        instruction: &str,
        images: &[InlineImage],
    ) -> std::result::Result<String, InferenceError> {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(Part::Text { text: instruction });
        for image in images {
            parts.push(Part::InlineData {
                inline_data: Blob {
                    mime_type: &image.mime_type,
                    data: BASE64.encode(&image.data),
                },
            });
        }

        let request = GenerateRequest {
            contents: vec![Content { role: "user", parts }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Other(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Other(format!("Failed to parse Gemini response: {}", e)))?;

        extract_text(parsed)
    }
}

/// Map a non-success response to an [`InferenceError`].
fn classify_error(status: StatusCode, body: &str) -> InferenceError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);

    let exhausted = detail
        .as_ref()
        .is_some_and(|d| d.status == RESOURCE_EXHAUSTED);
    let message = detail
        .map(|d| d.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    if status == StatusCode::TOO_MANY_REQUESTS || exhausted {
        warn!("Gemini rate limit: {}", message);
        InferenceError::RateLimited(format!("{} {}", status.as_u16(), message))
    } else {
        InferenceError::Other(format!("Gemini API returned {}: {}", status, message))
    }
}

/// Join the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> std::result::Result<String, InferenceError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(InferenceError::Other(format!("Prompt blocked: {}", reason)));
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(InferenceError::Other("No content in Gemini response".to_string()));
    }

    debug!("Gemini returned {} chars", text.chars().count());
    Ok(text)
}
