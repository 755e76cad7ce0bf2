//! Text Assist Gateway
//!
//! An HTTP gateway that fills user text, or text extracted from uploaded
//! documents, into static prompt templates and forwards them to a hosted LLM.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod prompts;
pub mod response;

pub use error::{AppError, Result};

use std::sync::Arc;

use backend::TextBackend;
use prompts::PromptLibrary;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub prompts: Arc<PromptLibrary>,
    pub backend: Arc<dyn TextBackend>,
}
