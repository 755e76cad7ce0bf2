//! Application error type and HTTP mapping

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Prompt template '{0}' not found")]
    PromptNotFound(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid upload: {}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error("Invalid or missing API Key")]
    Unauthorized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::HttpClient(_) | AppError::BackendError(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::PromptNotFound(_)
            | AppError::Template(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
