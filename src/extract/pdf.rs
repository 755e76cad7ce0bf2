//! PDF text extraction
//!
//! Text comes from the `Tj`/`TJ` show operators of each page's content
//! stream. Text positioning operators become spaces or line breaks.

use ::pdf::content::{Op, TextDrawAdjusted};
use ::pdf::file::FileOptions;
use tracing::debug;

use crate::error::{AppError, Result};

/// `TJ` adjustments wider than this (thousandths of an em) read as a word gap
const WORD_GAP: f32 = 200.0;

/// Extracts text from all pages of a PDF, one block per page.
pub fn extract_text(data: &[u8]) -> Result<String> {
    let file = FileOptions::cached()
        .load(data)
        .map_err(|e| AppError::Extraction(e.to_string()))?;
    let resolver = file.resolver();
    let mut full_text = String::new();

    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| AppError::Extraction(e.to_string()))?;
        if let Some(content) = &page.contents {
            let operations = content
                .operations(&resolver)
                .map_err(|e| AppError::Extraction(e.to_string()))?;
            push_page_text(&mut full_text, &operations);
        }
        push_break(&mut full_text, '\n');
    }

    debug!(pages = file.num_pages(), chars = full_text.len(), "Extracted PDF text");
    Ok(tidy(&full_text))
}

fn push_page_text(out: &mut String, operations: &[Op]) {
    for op in operations {
        match op {
            Op::TextDraw { text } => out.push_str(&text.to_string_lossy()),
            Op::TextDrawAdjusted { array } => {
                for item in array {
                    match item {
                        TextDrawAdjusted::Text(text) => out.push_str(&text.to_string_lossy()),
                        TextDrawAdjusted::Spacing(gap) if -gap >= WORD_GAP => push_break(out, ' '),
                        TextDrawAdjusted::Spacing(_) => {}
                    }
                }
            }
            Op::MoveTextPosition { translation } if translation.y != 0.0 => push_break(out, '\n'),
            Op::MoveTextPosition { .. } | Op::SetTextMatrix { .. } => push_break(out, ' '),
            Op::TextNewline | Op::EndText => push_break(out, '\n'),
            _ => {}
        }
    }
}

/// Separate the next run from the previous one. A line break wins over a
/// pending space; nothing is added at the very start.
fn push_break(out: &mut String, sep: char) {
    match out.chars().last() {
        None | Some('\n') => {}
        Some(' ') if sep == '\n' => {
            out.pop();
            out.push('\n');
        }
        Some(c) if c.is_whitespace() => {}
        Some(_) => out.push(sep),
    }
}

fn tidy(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
