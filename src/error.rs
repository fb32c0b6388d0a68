use crate::output_parser::ParseError;
use thiserror::Error;

/// Errors produced by the generation pipeline and its collaborators.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The generation or rendering backend was unreachable or returned an error
    /// (transport failure, timeout, authentication, rate limiting).
    #[error("backend '{backend}' unavailable: {message}")]
    BackendUnavailable {
        /// Which collaborator failed (e.g. `"gemini"`, `"renderer"`).
        backend: String,
        /// Human-readable cause.
        message: String,
        /// HTTP status, when the backend answered with one.
        status: Option<u16>,
    },

    /// The model reply did not contain the expected payload boundary.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// A payload was found but is not valid JSON.
    #[error("invalid payload ({reason}): {text}")]
    InvalidPayload {
        /// The serde error message.
        reason: String,
        /// The offending payload text.
        text: String,
    },

    /// The payload parsed but does not match the expected schema.
    #[error("schema '{schema}' violated: missing {missing:?}, mistyped {mistyped:?}")]
    SchemaViolation {
        /// Name of the schema that was checked.
        schema: String,
        /// Required field paths absent from the payload.
        missing: Vec<String>,
        /// Field paths present with an implausible type.
        mistyped: Vec<String>,
    },

    /// A cosmetic auxiliary lookup (e.g. a logo image) failed.
    ///
    /// Callers absorb this and degrade the affected field.
    #[error("auxiliary lookup for '{query}' failed: {message}")]
    AuxiliaryLookupFailed { query: String, message: String },

    /// A stage of a chained generation failed; later stages did not run.
    #[error("stage '{stage}' failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: Box<AnalysisError>,
    },

    /// The caller supplied unusable input (e.g. an empty niche).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration detected at build time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local filesystem failure (temporary report files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Build a [`AnalysisError::BackendUnavailable`] without an HTTP status.
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        AnalysisError::BackendUnavailable {
            backend: backend.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Wrap this error as the failure of a named chain stage.
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        AnalysisError::StageFailed {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any [`AnalysisError::StageFailed`] wrappers.
    pub fn root(&self) -> &AnalysisError {
        match self {
            AnalysisError::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<ParseError> for AnalysisError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::EmptyResponse => {
                AnalysisError::MalformedResponse("empty model response".to_string())
            }
            ParseError::MissingFence { tag } => AnalysisError::MalformedResponse(format!(
                "no ```{} fenced block in model response",
                tag
            )),
            ParseError::InvalidJson { reason, text } => {
                AnalysisError::InvalidPayload { reason, text }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fence_maps_to_malformed() {
        let err: AnalysisError = ParseError::MissingFence { tag: "json".into() }.into();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
        assert!(err.to_string().contains("```json"));
    }

    #[test]
    fn test_invalid_json_keeps_text() {
        let err: AnalysisError = ParseError::InvalidJson {
            reason: "trailing comma".into(),
            text: "{\"a\": 1,}".into(),
        }
        .into();
        match err {
            AnalysisError::InvalidPayload { text, .. } => assert_eq!(text, "{\"a\": 1,}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_root_unwraps_stage_failures() {
        let err = AnalysisError::MalformedResponse("nope".into())
            .in_stage("features")
            .in_stage("graph");
        assert!(matches!(err.root(), AnalysisError::MalformedResponse(_)));
        assert!(err.to_string().starts_with("stage 'graph' failed"));
    }
}
