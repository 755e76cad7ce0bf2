//! Backend module - upstream generation API clients

pub mod text_backend;

pub use text_backend::{
    create_text_backend, GeminiBackend, OpenAICompatibleBackend, TextBackend,
};
