//! Prompt module - static template library and placeholder rendering

pub mod library;
pub mod template;

pub use library::{Operation, PromptLibrary};
