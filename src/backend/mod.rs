//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait abstracts over hosted text-generation services,
//! translating between normalized [`LlmRequest`]/[`LlmResponse`] types and
//! provider-specific HTTP APIs. Built-in implementations: [`GeminiBackend`],
//! [`OpenAiBackend`] and the test/offline [`MockBackend`].
//!
//! ## Architecture
//!
//! ```text
//! pipeline ──► LlmRequest ──► Backend::complete() ──► LlmResponse
//!                                     │
//!                  ┌──────────────────┼──────────────────┐
//!            GeminiBackend       OpenAiBackend       MockBackend
//!       :generateContent    /v1/chat/completions   canned replies
//! ```
//!
//! Every transport, authentication or rate-limit failure is reported as
//! [`AnalysisError::BackendUnavailable`]. Nothing here retries.

pub mod gemini;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockReply};
#[cfg(feature = "openai")]
pub use openai::OpenAiBackend;

use crate::client::LlmConfig;
use crate::error::Result;
use crate::AnalysisError;
use async_trait::async_trait;
use reqwest::Client;

/// A normalized generation request — provider-agnostic.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Model identifier (e.g. `"gemini-1.0-pro"`, `"gpt-4o"`).
    pub model: String,

    /// The rendered prompt text.
    pub prompt: String,

    /// Sampling configuration (temperature, max tokens).
    pub config: LlmConfig,
}

/// A normalized generation response.
#[derive(Debug)]
pub struct LlmResponse {
    /// The generated text content.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,

    /// Provider-specific metadata (token counts, model info).
    /// Stored as raw JSON — each provider returns different fields.
    pub metadata: Option<serde_json::Value>,
}

/// Abstraction over text-generation providers.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a single, non-streaming generation call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Error for a request that never produced an HTTP response.
pub(crate) fn transport_error(backend: &str, url: &str, err: reqwest::Error) -> AnalysisError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    // reqwest includes the full URL (query string too) in its Display output.
    AnalysisError::backend(backend, format!("{} for {}: {}", kind, url, err.without_url()))
}

/// Error for a non-success HTTP status.
pub(crate) fn status_error(backend: &str, status: u16, body: String) -> AnalysisError {
    let hint = match status {
        401 | 403 => "authentication rejected",
        429 => "rate limited",
        500..=599 => "server error",
        _ => "request rejected",
    };
    AnalysisError::BackendUnavailable {
        backend: backend.to_string(),
        message: format!("HTTP {} ({}): {}", status, hint, body),
        status: Some(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_classifies() {
        let err = status_error("gemini", 429, "quota".into());
        match err {
            AnalysisError::BackendUnavailable { backend, message, status } => {
                assert_eq!(backend, "gemini");
                assert_eq!(status, Some(429));
                assert!(message.contains("rate limited"));
                assert!(message.contains("quota"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_auth() {
        let err = status_error("openai", 401, String::new());
        assert!(err.to_string().contains("authentication rejected"));
    }
}
