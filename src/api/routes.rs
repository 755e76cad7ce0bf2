//! HTTP route definitions

use crate::api::handlers;
use crate::api::models::*;
use crate::config::CorsConfig;
use crate::error::{AppError, Result};
use crate::middleware::AuthLayer;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Text Assist Gateway API",
        version = "0.1.0",
        description = "Summarize, rephrase, explain and quiz on text or uploaded documents through a hosted LLM.",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        handlers::root,
        handlers::summarize,
        handlers::rephrase,
        handlers::extract_keywords,
        handlers::generate_quiz,
        handlers::explain,
        handlers::summarize_doc,
        handlers::health_check,
    ),
    components(schemas(
        SummarizeRequest,
        SummaryResponse,
        RephraseRequest,
        RephraseResponse,
        KeywordsRequest,
        KeywordsResponse,
        QuizRequest,
        QuizResponse,
        ExplainRequest,
        ExplainResponse,
        DocumentUpload,
        DocumentSummaryResponse,
        WelcomeResponse,
        HealthResponse,
    )),
    tags(
        (name = "General", description = "Service information"),
        (name = "Text", description = "Prompted text operations"),
        (name = "Documents", description = "Document upload operations"),
        (name = "Health", description = "Health and monitoring endpoints"),
    )
)]
pub struct ApiDoc;

/// Registers the `api_key` scheme under the configured header name
struct SecurityAddon<'a> {
    header_name: &'a str,
}

impl Modify for SecurityAddon<'_> {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(self.header_name))),
            );
        }
    }
}

/// OpenAPI document for the given auth header
pub fn openapi_doc(header_name: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    SecurityAddon { header_name }.modify(&mut doc);
    doc
}

fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allow_origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .allow_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|e| AppError::Internal(format!("Invalid CORS origin '{}': {}", o, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Create the main application router
pub fn create_router(state: Arc<crate::AppState>) -> Result<Router> {
    let settings = state.settings.clone();

    let api_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/summarize", post(handlers::summarize))
        .route("/rephrase", post(handlers::rephrase))
        .route("/extract-keywords", post(handlers::extract_keywords))
        .route("/generate-quiz", post(handlers::generate_quiz))
        .route("/explain", post(handlers::explain))
        .route("/summarize-doc", post(handlers::summarize_doc));

    let api_routes = if settings.auth.enabled {
        api_routes.layer(AuthLayer::from_config(&settings.auth)?)
    } else {
        api_routes
    };

    let router = Router::new()
        // Health check endpoint (no auth required)
        .route("/health", get(handlers::health_check))
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_doc(&settings.auth.header_name)),
        )
        .merge(api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(settings.upload.max_bytes));

    let router = if settings.cors.enabled {
        router.layer(cors_layer(&settings.cors)?)
    } else {
        router
    };

    Ok(router.layer(TraceLayer::new_for_http()))
}
