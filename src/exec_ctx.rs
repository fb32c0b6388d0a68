//! Execution context passed explicitly into every generation.
//!
//! [`ExecCtx`] carries the HTTP client, generation backend, endpoint, model
//! and sampling configuration. Nothing is process-global: the server builds
//! one context at startup and hands it (or a per-call override) to each
//! pipeline invocation, and tests hand in a context backed by
//! [`MockBackend`](crate::backend::MockBackend).

use crate::backend::{Backend, GeminiBackend};
#[cfg(feature = "openai")]
use crate::backend::OpenAiBackend;
use crate::client::LlmConfig;
use crate::error::Result;
use crate::AnalysisError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.0-pro";

/// Shared execution context for generation calls.
///
/// Cheap to clone: the client and backend are reference-counted.
///
/// # Example
///
/// ```
/// use niche_analyst::ExecCtx;
/// use niche_analyst::backend::MockBackend;
/// use std::sync::Arc;
///
/// let ctx = ExecCtx::builder("http://unused")
///     .backend(Arc::new(MockBackend::fixed("```json\n{}\n```")))
///     .model("test-model")
///     .build()
///     .unwrap();
/// assert_eq!(ctx.model, "test-model");
/// ```
#[derive(Clone)]
pub struct ExecCtx {
    /// HTTP client (cheap to clone -- uses `Arc` internally).
    pub client: Client,
    /// Base URL for the provider (e.g. `https://generativelanguage.googleapis.com`).
    pub base_url: String,
    /// Generation backend.
    pub backend: Arc<dyn Backend>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling configuration.
    pub config: LlmConfig,
}

impl ExecCtx {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>) -> ExecCtxBuilder {
        ExecCtxBuilder {
            client: None,
            base_url: base_url.into(),
            backend: None,
            model: None,
            config: None,
            timeout: None,
        }
    }

    /// Copy of this context with a different sampling configuration.
    pub fn with_config(&self, config: LlmConfig) -> Self {
        Self {
            config,
            ..self.clone()
        }
    }

    /// Copy of this context targeting a different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCtx")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`ExecCtx`].
pub struct ExecCtxBuilder {
    client: Option<Client>,
    base_url: String,
    backend: Option<Arc<dyn Backend>>,
    model: Option<String>,
    config: Option<LlmConfig>,
    timeout: Option<Duration>,
}

impl ExecCtxBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the generation backend.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use the Gemini backend with the given API key.
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        self.backend = Some(Arc::new(GeminiBackend::new(api_key)));
        self
    }

    /// Use the OpenAI-compatible backend, optionally with a bearer key.
    #[cfg(feature = "openai")]
    pub fn openai(mut self, api_key: Option<String>) -> Self {
        let backend = match api_key {
            Some(key) => OpenAiBackend::new().with_api_key(key),
            None => OpenAiBackend::new(),
        };
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Set the model identifier. Default: [`DEFAULT_MODEL`].
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling configuration. Default: [`LlmConfig::default()`].
    pub fn config(mut self, config: LlmConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the request timeout. Default: 120 seconds.
    ///
    /// Ignored when a custom `Client` is provided via `.client()`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the execution context.
    pub fn build(self) -> Result<ExecCtx> {
        let backend = self
            .backend
            .ok_or_else(|| AnalysisError::InvalidConfig("no generation backend configured".into()))?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout.unwrap_or(Duration::from_secs(120)))
                .build()
                .map_err(|e| AnalysisError::InvalidConfig(format!("HTTP client: {}", e)))?,
        };

        Ok(ExecCtx {
            client,
            base_url: normalize_base_url(&self.base_url),
            backend,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            config: self.config.unwrap_or_default(),
        })
    }
}

/// Strip known provider path suffixes from a base URL.
/// This prevents double-pathing when backends append their own paths.
/// e.g., "https://api.openai.com/v1" -> "https://api.openai.com"
/// e.g., "https://generativelanguage.googleapis.com/v1beta" -> "https://generativelanguage.googleapis.com"
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    // Longest first
    for suffix in &["/v1/chat/completions", "/v1beta/models", "/v1beta", "/v1"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}
