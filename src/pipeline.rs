//! The structured generation pipeline.
//!
//! One invocation walks the same five steps for every use case:
//!
//! ```text
//! GenerationRequest ──► build_prompt ──► Backend::complete ──► extract ──► parse ──► validate
//!                                                                                      │
//!                                              StructuredResult  or  classified error ◄┘
//! ```
//!
//! Each step fails with its own [`AnalysisError`] kind and nothing is retried:
//! a request yields exactly one result or exactly one error.

use crate::{
    backend::LlmRequest,
    error::Result,
    exec_ctx::ExecCtx,
    output_parser::{self, FenceExtractor, PayloadExtractor},
    prompt::{self, PromptVars},
    schema::SchemaDescriptor,
    AnalysisError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

/// One generation call: what to ask about and which shape to expect back.
///
/// Consumed by [`generate`]; never persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Use-case name (for logs and errors).
    pub name: String,
    /// Prompt template with `{topic}` and `{key}` placeholders.
    pub template: String,
    /// The market niche or other subject being analyzed.
    pub topic: String,
    /// Shape the reply must match.
    pub schema: SchemaDescriptor,
    /// Extra placeholder values substituted into the template.
    pub extra_context: PromptVars,
}

impl GenerationRequest {
    /// Create a request with no extra context.
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        topic: impl Into<String>,
        schema: SchemaDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            topic: topic.into(),
            schema,
            extra_context: PromptVars::new(),
        }
    }

    /// Add a placeholder value.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_context.insert(key.into(), value.into());
        self
    }

    /// Render the prompt this request will send.
    pub fn prompt(&self) -> String {
        prompt::build_prompt(&self.template, &self.topic, &self.schema, &self.extra_context)
    }
}

/// A parsed payload that passed schema validation.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResult {
    /// Name of the schema the value was validated against.
    pub schema: String,
    /// The validated JSON value.
    pub value: Value,
}

impl StructuredResult {
    /// Deserialize into the use case's typed record.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.value.clone()).map_err(|e| AnalysisError::InvalidPayload {
            reason: format!("does not fit {}: {}", self.schema, e),
            text: self.value.to_string(),
        })
    }
}

/// Run a request through the pipeline, extracting a ```` ```json ```` payload.
pub async fn generate(ctx: &ExecCtx, request: GenerationRequest) -> Result<StructuredResult> {
    generate_with(ctx, request, &FenceExtractor::json()).await
}

/// Run a request through the pipeline and deserialize the result into `T`.
pub async fn generate_as<T: DeserializeOwned>(ctx: &ExecCtx, request: GenerationRequest) -> Result<T> {
    generate(ctx, request).await?.into_typed()
}

/// Run a request through the pipeline with a caller-chosen extractor.
pub async fn generate_with(
    ctx: &ExecCtx,
    request: GenerationRequest,
    extractor: &dyn PayloadExtractor,
) -> Result<StructuredResult> {
    if request.topic.trim().is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "{}: topic must not be empty",
            request.name
        )));
    }

    let prompt = request.prompt();
    let reply = invoke(ctx, &request.name, prompt).await?;

    let payload = extractor.extract(&reply)?;
    let value = output_parser::parse_payload(&payload)?;
    request.schema.validate(&value)?;

    info!(use_case = %request.name, schema = request.schema.name(), "structured result accepted");
    Ok(StructuredResult {
        schema: request.schema.name().to_string(),
        value,
    })
}

/// Send a free-form prompt and return the fenced markup payload (no schema).
///
/// Used for the document-markup step of report rendering.
pub async fn generate_markup(
    ctx: &ExecCtx,
    name: &str,
    prompt: String,
    extractor: &dyn PayloadExtractor,
) -> Result<String> {
    let reply = invoke(ctx, name, prompt).await?;
    let payload = extractor.extract(&reply)?;
    if payload.is_empty() {
        return Err(AnalysisError::MalformedResponse(format!(
            "{}: empty ```{} block",
            name,
            extractor.tag()
        )));
    }
    Ok(payload)
}

/// One backend round-trip.
async fn invoke(ctx: &ExecCtx, name: &str, prompt: String) -> Result<String> {
    let request = LlmRequest {
        model: ctx.model.clone(),
        prompt,
        config: ctx.config.clone(),
    };
    debug!(
        use_case = name,
        backend = ctx.backend.name(),
        model = %ctx.model,
        prompt_len = request.prompt.len(),
        "calling generation backend"
    );

    let response = ctx
        .backend
        .complete(&ctx.client, &ctx.base_url, &request)
        .await?;

    debug!(use_case = name, status = response.status, reply_len = response.text.len(), "backend replied");
    Ok(response.text)
}
