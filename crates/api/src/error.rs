use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use spotbridge_core::ExchangeError;

/// Everything a handler can fail with, rendered as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    /// Request body or query string could not be extracted.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Exchange(err) => match err {
                ExchangeError::Validation(_) => StatusCode::BAD_REQUEST,
                ExchangeError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
                ExchangeError::Transport(_)
                | ExchangeError::Status { .. }
                | ExchangeError::Decode(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::Rejected { status, .. } => *status,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %detail, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %detail, "Request rejected");
        }
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
