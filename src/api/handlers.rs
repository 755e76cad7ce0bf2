//! HTTP request handlers

use crate::api::models::{
    DocumentSummaryResponse, DocumentUpload, ExplainRequest, ExplainResponse, HealthResponse,
    KeywordsRequest, KeywordsResponse, QuizRequest, QuizResponse, RephraseRequest,
    RephraseResponse, SummarizeRequest, SummaryResponse, WelcomeResponse,
};
use crate::error::{AppError, Result};
use crate::extract;
use crate::prompts::Operation;
use crate::response::parse_json_reply;
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_DOC_STYLE: &str = "concise";
const NO_TEXT_MESSAGE: &str = "Could not extract text from the uploaded file.";

/// Render the operation's template and send it upstream.
///
/// Template errors propagate; generation failures are returned as `Err` for
/// the caller to embed in its reply.
async fn generate(
    state: &AppState,
    op: Operation,
    vars: &[(&str, &str)],
) -> Result<std::result::Result<String, AppError>> {
    let prompt = state.prompts.render(op, vars)?;
    info!(
        operation = %op,
        backend = %state.backend.name(),
        prompt_len = prompt.len(),
        "Dispatching prompt"
    );

    let reply = state.backend.generate(&prompt).await;
    match &reply {
        Ok(text) => info!(operation = %op, reply_len = text.len(), "Generation completed"),
        Err(e) => warn!(operation = %op, error = %e, "Generation failed"),
    }
    Ok(reply)
}

fn embed_error(reply: std::result::Result<String, AppError>) -> String {
    reply.unwrap_or_else(|e| format!("Error: {}", e))
}

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    tag = "General",
    responses(
        (status = 200, description = "Welcome message", body = WelcomeResponse),
        (status = 401, description = "Invalid or missing API key")
    ),
    security(("api_key" = []))
)]
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Gemini API integration!".to_string(),
    })
}

/// Summarize text in a given style
#[utoipa::path(
    post,
    path = "/summarize",
    tag = "Text",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Summary, or an embedded error message", body = SummaryResponse),
        (status = 401, description = "Invalid or missing API key")
    ),
    security(("api_key" = []))
)]
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummaryResponse>> {
    let reply = generate(
        &state,
        Operation::Summarize,
        &[("style", request.style.as_str()), ("text", request.text.as_str())],
    )
    .await?;

    Ok(Json(SummaryResponse {
        summary: embed_error(reply),
    }))
}

/// Rephrase text in a given tone
#[utoipa::path(
    post,
    path = "/rephrase",
    tag = "Text",
    request_body = RephraseRequest,
    responses(
        (status = 200, description = "Rephrased text, or an embedded error message", body = RephraseResponse),
        (status = 401, description = "Invalid or missing API key")
    ),
    security(("api_key" = []))
)]
pub async fn rephrase(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RephraseRequest>,
) -> Result<Json<RephraseResponse>> {
    let reply = generate(
        &state,
        Operation::Rephrase,
        &[("tone", request.tone.as_str()), ("text", request.text.as_str())],
    )
    .await?;

    Ok(Json(RephraseResponse {
        rephrased: embed_error(reply),
    }))
}

/// Extract keywords from text
#[utoipa::path(
    post,
    path = "/extract-keywords",
    tag = "Text",
    request_body = KeywordsRequest,
    responses(
        (status = 200, description = "Keywords, or an embedded error message", body = KeywordsResponse),
        (status = 401, description = "Invalid or missing API key")
    ),
    security(("api_key" = []))
)]
pub async fn extract_keywords(
    State(state): State<Arc<AppState>>,
    Json(request): Json<KeywordsRequest>,
) -> Result<Json<KeywordsResponse>> {
    let reply = generate(&state, Operation::ExtractKeywords, &[("text", request.text.as_str())]).await?;

    Ok(Json(KeywordsResponse {
        keywords: embed_error(reply),
    }))
}

/// Generate a quiz and parse the model's JSON reply
#[utoipa::path(
    post,
    path = "/generate-quiz",
    tag = "Text",
    request_body = QuizRequest,
    responses(
        (status = 200, description = "Parsed quiz, or the raw reply with an error", body = QuizResponse),
        (status = 400, description = "Question count is zero"),
        (status = 401, description = "Invalid or missing API key")
    ),
    security(("api_key" = []))
)]
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<QuizResponse>> {
    if request.count == 0 {
        return Err(AppError::BadRequest("count must be at least 1".to_string()));
    }

    let count = request.count.to_string();
    let reply = generate(
        &state,
        Operation::GenerateQuiz,
        &[("count", count.as_str()), ("text", request.text.as_str())],
    )
    .await?;

    let raw = match reply {
        Ok(raw) => raw,
        Err(e) => {
            return Ok(Json(QuizResponse {
                quiz_raw: Some(String::new()),
                error: Some(format!("Error: {}", e)),
                ..Default::default()
            }))
        }
    };

    let response = match parse_json_reply(&raw) {
        Ok(quiz) => QuizResponse {
            quiz: Some(quiz),
            ..Default::default()
        },
        Err(e) => {
            warn!(error = %e, "Quiz reply is not valid JSON");
            QuizResponse {
                quiz_raw: Some(raw),
                error: Some(format!("Failed to parse quiz JSON: {}", e)),
                ..Default::default()
            }
        }
    };

    Ok(Json(response))
}

/// Explain text for a given audience level
#[utoipa::path(
    post,
    path = "/explain",
    tag = "Text",
    request_body = ExplainRequest,
    responses(
        (status = 200, description = "Explanation, or an embedded error message", body = ExplainResponse),
        (status = 401, description = "Invalid or missing API key")
    ),
    security(("api_key" = []))
)]
pub async fn explain(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>> {
    let reply = generate(
        &state,
        Operation::Explain,
        &[("level", request.level.as_str()), ("text", request.text.as_str())],
    )
    .await?;

    Ok(Json(ExplainResponse {
        explanation: embed_error(reply),
    }))
}

/// Summarize an uploaded PDF or DOCX document
#[utoipa::path(
    post,
    path = "/summarize-doc",
    tag = "Documents",
    request_body(content = DocumentUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Summary, or an error message", body = DocumentSummaryResponse),
        (status = 400, description = "Missing file field or malformed multipart body"),
        (status = 413, description = "Upload exceeds the configured size limit"),
        (status = 401, description = "Invalid or missing API key")
    ),
    security(("api_key" = []))
)]
pub async fn summarize_doc(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DocumentSummaryResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut style: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                info!(filename = %filename, bytes = data.len(), "Received document upload");
                file = Some((filename, data.to_vec()));
            }
            "style" => {
                style = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::BadRequest("File data not found in request.".to_string()))?;
    let style = style
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DOC_STYLE.to_string());

    let extracted = tokio::task::spawn_blocking(move || extract::extract_text(&filename, &data))
        .await
        .map_err(|e| AppError::Internal(format!("Extraction task failed: {}", e)))?;

    let text = match extracted {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Document extraction failed");
            return Ok(Json(DocumentSummaryResponse {
                error: Some(e.to_string()),
                ..Default::default()
            }));
        }
    };

    if text.trim().is_empty() {
        return Ok(Json(DocumentSummaryResponse {
            error: Some(NO_TEXT_MESSAGE.to_string()),
            ..Default::default()
        }));
    }

    let reply = generate(
        &state,
        Operation::Summarize,
        &[("style", style.as_str()), ("text", text.as_str())],
    )
    .await?;

    Ok(Json(DocumentSummaryResponse {
        summary: Some(embed_error(reply)),
        ..Default::default()
    }))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service status and upstream reachability", body = HealthResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let backend_healthy = state.backend.health_check().await;

    Json(HealthResponse {
        status: if backend_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: format!("{} ({})", state.backend.name(), state.backend.protocol()),
        backend_healthy,
        model: state.backend.model().to_string(),
        prompts: state.prompts.len(),
        timestamp: Utc::now().timestamp(),
    })
}
