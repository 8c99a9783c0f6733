use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::backend::BackendError;

/// Hard faults: structural violations of the protocol contract that abort the
/// request. Business-level failures never reach this type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidEnvelope(String),

    #[error("Invalid request: missing method")]
    MissingMethod,

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Device backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn missing_field(field: &str) -> Self {
        AppError::InvalidParams(format!("Missing field: {}", field))
    }

    pub fn invalid_field(field: &str, expected: &str) -> Self {
        AppError::InvalidParams(format!("Field {} must be {}", field, expected))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Parse(_)
            | AppError::InvalidEnvelope(_)
            | AppError::MissingMethod
            | AppError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON-RPC 2.0 error code for this fault.
    pub fn code(&self) -> i64 {
        match self {
            AppError::Parse(_) => -32700,
            AppError::InvalidEnvelope(_) | AppError::MissingMethod => -32600,
            AppError::InvalidParams(_) => -32602,
            AppError::Backend(_) | AppError::Serialization(_) => -32603,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AppError::Parse(_) => "Parse error",
            AppError::InvalidEnvelope(_) | AppError::MissingMethod => "Invalid Request",
            AppError::InvalidParams(_) => "Invalid params",
            AppError::Backend(_) | AppError::Serialization(_) => "Internal error",
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Parse(e) => e.to_string(),
            AppError::InvalidEnvelope(detail) | AppError::InvalidParams(detail) => detail.clone(),
            AppError::MissingMethod => "method must be a string".to_string(),
            AppError::Backend(e) => e.to_string(),
            AppError::Serialization(e) => e.to_string(),
        }
    }
}

/// A hard fault paired with the request id, when decoding got far enough to
/// read one.
#[derive(Debug)]
pub struct Fault {
    pub id: Option<i64>,
    pub error: AppError,
}

impl Fault {
    pub fn new(id: Option<i64>, error: AppError) -> Self {
        Self { id, error }
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!(error = %self.error, "MCP request failed");
        } else {
            tracing::warn!(error = %self.error, "MCP request rejected");
        }

        let id = self.id.map(Value::from).unwrap_or(Value::Null);
        let body = Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {
                "code": self.error.code(),
                "message": self.error.message(),
                "data": { "detail": self.error.detail() }
            }
        }));

        (status, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        Fault::new(None, self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
