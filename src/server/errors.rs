use crate::AnalysisError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Errors returned by the HTTP handlers.
///
/// Every variant renders as `{"detail": "<message>"}`.
#[derive(Debug)]
pub enum AppError {
    /// Failures from the analysis pipeline.
    Analysis(AnalysisError),
    /// The request itself was unusable.
    BadRequest(String),
    /// Anything else.
    Internal(anyhow::Error),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::Analysis(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

/// HTTP status for a pipeline failure.
pub fn status_for(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::BackendUnavailable { .. }
        | AnalysisError::MalformedResponse(_)
        | AnalysisError::InvalidPayload { .. }
        | AnalysisError::SchemaViolation { .. }
        | AnalysisError::StageFailed { .. } => StatusCode::BAD_GATEWAY,
        AnalysisError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AnalysisError::AuxiliaryLookupFailed { .. }
        | AnalysisError::InvalidConfig(_)
        | AnalysisError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Analysis(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    error!(error = ?err, "analysis failed");
                } else {
                    warn!(error = %err, "rejected request");
                }
                (status, err.to_string())
            }
            AppError::BadRequest(msg) => {
                warn!(%msg, "bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AnalysisError::backend("gemini", "timeout")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AnalysisError::MalformedResponse("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AnalysisError::MalformedResponse("x".into()).in_stage("features")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AnalysisError::InvalidInput("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AnalysisError::InvalidConfig("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
