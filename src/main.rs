//! Main entry point for the Text Assist Gateway

use std::sync::Arc;
use text_assist_gateway::{
    api, backend::create_text_backend, config::Settings, prompts::PromptLibrary, AppState,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if settings.logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().pretty()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be populated
    let dotenv_result = dotenvy::dotenv();

    let settings = Settings::load()?;
    init_logging(&settings);

    if let Err(e) = dotenv_result {
        if !e.not_found() {
            warn!(error = %e, "Failed to read .env file");
        }
    }

    settings.validate()?;
    info!(
        "Loaded configuration: server={}:{}",
        settings.server.host, settings.server.port
    );

    let prompts = Arc::new(PromptLibrary::load(&settings.prompts.path)?);
    let backend = create_text_backend(&settings.backend)?;
    info!(
        backend = %backend.name(),
        protocol = %backend.protocol(),
        model = %backend.model(),
        "Generation backend ready"
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let app_state = Arc::new(AppState {
        settings: Arc::new(settings),
        prompts,
        backend,
    });

    let app = api::routes::create_router(app_state)?;

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
