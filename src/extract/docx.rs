//! DOCX text extraction
//!
//! A `.docx` file is a zip archive; the body text lives in `word/document.xml`
//! as `<w:t>` runs grouped into `<w:p>` paragraphs.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::debug;
use zip::ZipArchive;

use crate::error::{AppError, Result};

const DOCUMENT_PART: &str = "word/document.xml";

static RUN_RE: OnceLock<Regex> = OnceLock::new();
static ENTITY_RE: OnceLock<Regex> = OnceLock::new();

fn run_regex() -> &'static Regex {
    RUN_RE.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br\b[^>]*/>|</w:p>")
            .expect("static regex is valid")
    })
}

fn entity_regex() -> &'static Regex {
    ENTITY_RE.get_or_init(|| {
        Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|amp|quot|apos);")
            .expect("static regex is valid")
    })
}

/// Extracts paragraph text from a DOCX document, one line per paragraph.
pub fn extract_text(data: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| AppError::Extraction(format!("not a DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| AppError::Extraction(format!("missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::Extraction(format!("unreadable {}: {}", DOCUMENT_PART, e)))?;

    let text = text_from_document_xml(&xml);
    debug!(chars = text.len(), "Extracted DOCX text");
    Ok(text)
}

/// Pull visible text out of a WordprocessingML body
pub fn text_from_document_xml(xml: &str) -> String {
    let mut out = String::new();

    for caps in run_regex().captures_iter(xml) {
        match caps.get(1) {
            Some(run) => out.push_str(&decode_entities(run.as_str())),
            None => match &caps[0] {
                "<w:tab/>" => out.push('\t'),
                _ => out.push('\n'),
            },
        }
    }

    out.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn decode_entities(s: &str) -> String {
    entity_regex()
        .replace_all(s, |caps: &Captures| match &caps[1] {
            "lt" => "<".to_string(),
            "gt" => ">".to_string(),
            "amp" => "&".to_string(),
            "quot" => "\"".to_string(),
            "apos" => "'".to_string(),
            numeric => {
                let code = match numeric.strip_prefix("#x") {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => numeric[1..].parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string())
            }
        })
        .into_owned()
}
