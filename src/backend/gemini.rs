//! Backend for the Google Generative Language API (Gemini).
//!
//! Endpoint: `{base}/v1beta/models/{model}:generateContent`, authenticated with
//! the `x-goog-api-key` header so the key never appears in a URL.
//! The reply text is the concatenation of the first candidate's text parts.

use super::{status_error, transport_error, Backend, LlmRequest, LlmResponse};
use crate::error::Result;
use crate::AnalysisError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Public Generative Language API host.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
    #[serde(default)]
    usage_metadata: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<ContentResponse>,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Backend for Google's Gemini models.
///
/// # Example
///
/// ```
/// use niche_analyst::backend::GeminiBackend;
///
/// let backend = GeminiBackend::new("AIza...");
/// assert!(format!("{:?}", backend).contains("***"));
/// ```
#[derive(Clone)]
pub struct GeminiBackend {
    api_key: String,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = if self.api_key.len() > 6 {
            format!("{}***", &self.api_key[..6])
        } else {
            "***".to_string()
        };
        f.debug_struct("GeminiBackend")
            .field("api_key", &redacted)
            .finish()
    }
}

impl GeminiBackend {
    /// Create a Gemini backend authenticated with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    fn endpoint(base_url: &str, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        )
    }

    fn build_body(request: &LlmRequest) -> GeminiRequest<'_> {
        GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.config.temperature,
                max_output_tokens: request.config.max_tokens,
            },
        }
    }

    /// Join the text parts of the first candidate.
    fn candidate_text(response: &GeminiResponse) -> Option<String> {
        let parts = &response.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        let url = Self::endpoint(base_url, &request.model);

        let resp = client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|e| transport_error(self.name(), &url, e))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(self.name(), status, body));
        }

        let parsed: GeminiResponse = resp.json().await.map_err(|e| {
            AnalysisError::backend(self.name(), format!("unreadable response body: {}", e))
        })?;

        let text = Self::candidate_text(&parsed).ok_or_else(|| {
            let feedback = parsed
                .prompt_feedback
                .as_ref()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "no candidates".to_string());
            AnalysisError::MalformedResponse(format!("Gemini returned no text ({})", feedback))
        })?;

        Ok(LlmResponse {
            text,
            status,
            metadata: parsed.usage_metadata,
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
