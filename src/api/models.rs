//! API request and response models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Summarize request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SummarizeRequest {
    /// Summary style, e.g. "bullet points" or "one paragraph"
    pub style: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Rephrase request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RephraseRequest {
    /// Target tone, e.g. "formal"
    pub tone: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RephraseResponse {
    pub rephrased: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct KeywordsRequest {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct KeywordsResponse {
    pub keywords: String,
}

/// Quiz generation request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct QuizRequest {
    /// Number of questions to generate
    #[serde(default = "default_count")]
    pub count: u32,
    pub text: String,
}

fn default_count() -> u32 {
    5
}

/// Parsed quiz, or the raw reply when it was not valid JSON
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct QuizResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub quiz: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_raw: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Explain request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ExplainRequest {
    /// Audience level, e.g. "beginner"
    pub level: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ExplainResponse {
    pub explanation: String,
}

/// Multipart form accepted by `/summarize-doc`
#[derive(Debug, ToSchema)]
pub struct DocumentUpload {
    /// A `.pdf` or `.docx` file
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Summary style, defaults to "concise"
    pub style: Option<String>,
}

/// Document summary, or an error message
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct DocumentSummaryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy", or "degraded" when the upstream API does not answer
    pub status: String,
    pub version: String,
    pub backend: String,
    pub backend_healthy: bool,
    pub model: String,
    pub prompts: usize,
    pub timestamp: i64,
}
