//! Prompt template library loaded once at start-up

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::prompts::template;

/// Operations served by the gateway, each backed by one template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Summarize,
    Rephrase,
    ExtractKeywords,
    GenerateQuiz,
    Explain,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Summarize,
        Operation::Rephrase,
        Operation::ExtractKeywords,
        Operation::GenerateQuiz,
        Operation::Explain,
    ];

    /// Key of the template in the library file
    pub fn key(&self) -> &'static str {
        match self {
            Operation::Summarize => "summarize",
            Operation::Rephrase => "rephrase",
            Operation::ExtractKeywords => "extract_keywords",
            Operation::GenerateQuiz => "generate_quiz",
            Operation::Explain => "explain",
        }
    }

    /// Placeholders the handler supplies for this operation
    pub fn variables(&self) -> &'static [&'static str] {
        match self {
            Operation::Summarize => &["style", "text"],
            Operation::Rephrase => &["tone", "text"],
            Operation::ExtractKeywords => &["text"],
            Operation::GenerateQuiz => &["count", "text"],
            Operation::Explain => &["level", "text"],
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable mapping of operation name to template string
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: HashMap<String, String>,
}

impl PromptLibrary {
    /// Load the library from a JSON object file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(format!(
                "Failed to read prompt library '{}': {}",
                path.display(),
                e
            ))
        })?;

        let templates: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            AppError::Internal(format!(
                "Failed to parse prompt library '{}': {}",
                path.display(),
                e
            ))
        })?;

        let library = Self::from_templates(templates)?;
        info!(
            path = %path.display(),
            templates = library.len(),
            "Loaded prompt library"
        );
        Ok(library)
    }

    /// Build a library from an in-memory map, validating it
    pub fn from_templates(templates: HashMap<String, String>) -> Result<Self> {
        let library = Self { templates };
        library.validate()?;
        Ok(library)
    }

    /// Every operation must have a template that only uses the values it is given
    pub fn validate(&self) -> Result<()> {
        for op in Operation::ALL {
            let template = self
                .templates
                .get(op.key())
                .ok_or_else(|| AppError::PromptNotFound(op.key().to_string()))?;

            let names = template::placeholders(template)
                .map_err(|e| AppError::Template(format!("template '{}': {}", op, e)))?;

            if let Some(unknown) = names.iter().find(|n| !op.variables().contains(&n.as_str())) {
                return Err(AppError::Template(format!(
                    "template '{}' references unknown placeholder '{}'",
                    op, unknown
                )));
            }
            debug!(operation = %op, placeholders = ?names, "Validated prompt template");
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Render the template for `op` with the supplied values
    pub fn render(&self, op: Operation, vars: &[(&str, &str)]) -> Result<String> {
        let template = self
            .get(op.key())
            .ok_or_else(|| AppError::PromptNotFound(op.key().to_string()))?;
        template::render(template, vars)
    }

    /// Sorted template names
    pub fn operations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
