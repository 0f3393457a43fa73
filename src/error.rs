/// Errors surfaced to HTTP clients.
///
/// Client mistakes (bad dates, unknown routes, wrong method) are reported
/// verbatim. Everything else becomes a bare 500; the detail goes to the log
/// only.

use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDateFormat { value: String },

    #[error("no route matches {path}")]
    NotFound { path: String },

    #[error("method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("data store error: {0}")]
    Store(#[from] StoreError),

    #[error("stored date '{0}' is not YYYY-MM-DD")]
    CorruptDate(String),

    #[error("lookback of {lookback_days} days does not give a valid window")]
    WindowOutOfRange { lookback_days: i64 },

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidDateFormat { .. } => 400,
            ApiError::NotFound { .. } => 404,
            ApiError::MethodNotAllowed { .. } => 405,
            ApiError::Store(_)
            | ApiError::CorruptDate(_)
            | ApiError::WindowOutOfRange { .. }
            | ApiError::Serialization(_) => 500,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    /// Stable name for the `error` field of the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidDateFormat { .. } => "InvalidDateFormat",
            ApiError::NotFound { .. } => "NotFound",
            ApiError::MethodNotAllowed { .. } => "MethodNotAllowed",
            ApiError::Store(_)
            | ApiError::CorruptDate(_)
            | ApiError::WindowOutOfRange { .. }
            | ApiError::Serialization(_) => "InternalError",
        }
    }

    /// JSON body sent to the client.
    pub fn to_json(&self) -> serde_json::Value {
        let message = if self.is_internal() {
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        json!({
            "error": self.kind(),
            "message": message,
        })
    }
}
