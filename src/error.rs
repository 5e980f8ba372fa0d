// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with the status code and client-facing JSON body for each
/// failure kind. Every response body carries a human-readable `message`;
/// 500s additionally echo the underlying error detail under `error`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error (store or upstream-service failure)
    Internal { message: String, detail: Option<String> },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::Internal { message, .. } => message,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Internal { message, detail } => {
                let mut body = json!({ "message": message });
                if let Some(detail) = detail {
                    body["error"] = json!(detail);
                }
                body
            }
            _ => json!({ "message": self.message() }),
        }
    }
}

// Static constructors
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    /// Store failure surfaced with an endpoint-specific message and the
    /// underlying error echoed to the caller.
    pub fn store(message: impl Into<String>, err: crate::store::StoreError) -> Self {
        let message = message.into();
        tracing::error!("{}: {}", message, err);
        ApiError::Internal {
            message,
            detail: Some(err.to_string()),
        }
    }

    /// External-service failure, same shape as a store failure.
    pub fn upstream(message: impl Into<String>, err: crate::payment::PaymentError) -> Self {
        let message = message.into();
        tracing::error!("{}: {}", message, err);
        ApiError::Internal {
            message,
            detail: Some(err.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
