//! API Error Mapping

use analytics::AnalyticsError;
use assistant::LlmError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use inference_engine::InferenceError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced to clients as `{"error": message}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown store id
    #[error("{0}")]
    NotFound(String),
    /// Missing or wrongly typed request field
    #[error("{0}")]
    InvalidInput(String),
    /// Model and feature schema out of step
    #[error("{0}")]
    Configuration(String),
    /// Model inference or chat completion failed
    #[error("{0}")]
    Upstream(String),
    /// Optional backend not configured
    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_) | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::StoreNotFound(_) => ApiError::NotFound(err.to_string()),
            InferenceError::InvalidInputShape { .. } | InferenceError::ModelLoadError(_) => {
                ApiError::Configuration(err.to_string())
            }
            InferenceError::InferenceFailed(_) => ApiError::Upstream(err.to_string()),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::StoreNotFound(_) => ApiError::NotFound(err.to_string()),
            AnalyticsError::EmptyTable | AnalyticsError::ImportancesUnavailable => {
                ApiError::InvalidInput(err.to_string())
            }
            AnalyticsError::ImportanceLength { .. } => ApiError::Configuration(err.to_string()),
            AnalyticsError::Inference(inner) => inner.into(),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::InvalidRequest(msg) => ApiError::InvalidInput(msg),
            LlmError::NotConfigured => ApiError::Unavailable("OPENAI_API_KEY is not set".to_string()),
            other => {
                error!("Chat completion error: {}", other);
                ApiError::Upstream("OpenAI API error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", self);
        } else {
            warn!(status = status.as_u16(), "{}", self);
        }
        metrics::counter!("http_errors_total", "status" => status.as_u16().to_string()).increment(1);

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
