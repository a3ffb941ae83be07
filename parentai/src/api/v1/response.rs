//! # V1 API Response Envelope
//!
//! Every endpoint returns an [`ApiResponse<T>`]:
//!
//! ```json
//! {
//!   "data": { ... },                                        // present on success
//!   "error": { "code": "invalid_request", "message": "..." }  // present on error
//! }
//! ```
//!
//! Exactly one of `data` and `error` is present.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ParentAiError;

/// Machine-readable error code, serialized snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// HTTP 400.
    InvalidRequest,
    /// HTTP 404.
    NotFound,
    /// HTTP 500. Internal details are never leaked to the client.
    InternalError,
    /// HTTP 503.
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::NotFound => write!(f, "not_found"),
            Self::InternalError => write!(f, "internal_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Safe to show to end users.
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<ParentAiError> for ApiResponse<T> {
    /// Validation and lookup failures keep their message; everything else is
    /// logged and replaced by a generic text.
    fn from(err: ParentAiError) -> Self {
        match err {
            ParentAiError::NotFound(ref msg) => ApiResponse::error(ErrorCode::NotFound, msg.clone()),

            ParentAiError::Validation(ref msg) => {
                ApiResponse::error(ErrorCode::InvalidRequest, msg.clone())
            }

            ParentAiError::Json(ref e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            ref unavailable @ (ParentAiError::LlmUnavailable(_)
            | ParentAiError::LlmRateLimit { .. }
            | ParentAiError::ApiRateLimit { .. }
            | ParentAiError::LlmTimeout(_)
            | ParentAiError::LlmTransient(_)
            | ParentAiError::Cancelled) => {
                tracing::warn!(error = %unavailable, "Service unavailable");
                ApiResponse::error(ErrorCode::ServiceUnavailable, unavailable.short_reason())
            }

            ref internal @ (ParentAiError::Config(_)
            | ParentAiError::Knowledge(_)
            | ParentAiError::Embedding(_)
            | ParentAiError::Retrieval(_)
            | ParentAiError::Http(_)
            | ParentAiError::Io(_)
            | ParentAiError::ApiAuth(_)
            | ParentAiError::Llm(_)
            | ParentAiError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}

impl IntoResponse for ParentAiError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}
