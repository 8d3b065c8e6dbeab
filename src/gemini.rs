use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::RunError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[allow(dead_code)]
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    // Missing entirely when the prompt itself was blocked
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    pub usage_metadata: Option<UsageMetadata>,

    pub model_version: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,

    // Ex: 'STOP' | 'MAX_TOKENS' | 'SAFETY' | 'RECITATION'
    pub finish_reason: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,

    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Part {
    // Only text parts are requested; other part kinds deserialize with no text
    pub text: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u64>,
    pub candidates_token_count: Option<u64>,
    pub total_token_count: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
struct ErrorResponse {
    code: i32,
    message: String,

    // Ex: 'INVALID_ARGUMENT' | 'PERMISSION_DENIED'
    status: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
struct ErrorResponseContainer {
    error: ErrorResponse,
}

impl GenerateContentResponse {
    /// The text of the first part of the first candidate, if there is one.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Anything that can turn a model name and a block of text into generated content.
pub trait ContentGenerator {
    async fn generate_content(
        &self,
        model: &str,
        text: &str,
    ) -> Result<GenerateContentResponse, RunError>;
}

/// `GeminiClient` talks to the Gemini `generateContent` REST endpoint.
///
/// A fresh HTTP client is built for every request so a construction failure
/// only costs the current generation, not the session.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        GeminiClient {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Builds the request body for a single user turn carrying `text`.
    fn build_request_body(text: &str) -> serde_json::Value {
        json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": text }],
                }
            ]
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> RunError {
        if err.is_timeout() {
            RunError::Timeout(self.timeout)
        } else {
            RunError::Transport(err)
        }
    }

    /// Parses a non-success body, preferring the API's own error envelope.
    fn api_error(status: u16, body: &str) -> RunError {
        let message = match serde_json::from_str::<ErrorResponseContainer>(body) {
            Ok(container) => match container.error.status {
                Some(kind) => format!(
                    "{} (code {}, {})",
                    container.error.message, container.error.code, kind
                ),
                None => format!("{} (code {})", container.error.message, container.error.code),
            },
            Err(_) => body.to_string(),
        };
        RunError::Api { status, message }
    }
}

impl ContentGenerator for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        text: &str,
    ) -> Result<GenerateContentResponse, RunError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(RunError::ClientInit)?;

        let url = self.endpoint(model);
        debug!(%url, chars = text.len(), "sending generateContent request");

        let response = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request_body(text))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "generateContent returned an error status");
            return Err(Self::api_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        debug!(
            candidates = parsed.candidates.len(),
            total_tokens = parsed.usage_metadata.as_ref().and_then(|u| u.total_token_count),
            "received generateContent response"
        );
        Ok(parsed)
    }
}
