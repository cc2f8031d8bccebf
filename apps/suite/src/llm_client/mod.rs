//! LLM Client: the single point of entry for all Gemini API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the generative-language API
//! directly. The suite controller reaches it only through [`TextGenerator`].
//!
//! Model: gemini-2.5-flash-preview-09-2025 (hardcoded, not configurable)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

/// The model used for every generation call.
pub const MODEL: &str = "gemini-2.5-flash-preview-09-2025";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned no text candidate")]
    EmptyContent,
}

/// Produces text for a prompt. Implemented by [`GeminiClient`]; tests swap in stubs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, credential: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// Every level is optional so an unexpected shape parses and then fails
/// `text()`, instead of failing deep inside serde.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if present.
    pub fn text(&self) -> Option<&str> {
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

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Thin wrapper over the `generateContent` endpoint. One POST per call, no retries.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_base: &str) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{MODEL}:generateContent",
                api_base.trim_end_matches('/')
            ),
        })
    }

    /// Makes one call and returns the parsed response. The credential travels
    /// as the `key` query parameter and is never logged.
    pub async fn call(
        &self,
        prompt: &str,
        credential: &str,
    ) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", credential)])
            .json(&request_body)
            .send()
            .await
            .map_err(redact)?;

        let status = response.status();
        let body = response.text().await.map_err(redact)?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// reqwest errors carry the request URL, and with it the `key` parameter.
fn redact(e: reqwest::Error) -> LlmError {
    LlmError::Http(e.without_url())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, credential: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, credential).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        debug!(
            "LLM call succeeded: prompt_chars={}, response_chars={}",
            prompt.chars().count(),
            text.chars().count()
        );
        Ok(text.to_string())
    }
}
