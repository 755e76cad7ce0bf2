//! JSON extraction from free-text model replies

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

static FENCE_RE: OnceLock<Regex> = OnceLock::new();

fn fence_regex() -> &'static Regex {
    FENCE_RE.get_or_init(|| {
        Regex::new(r"```[A-Za-z0-9_-]*[ \t]*\r?\n?([\s\S]*?)\s*```").expect("static regex is valid")
    })
}

/// Remove Markdown code-fence markers around a reply.
///
/// The body of the first fenced block wins; an unterminated opening fence is
/// dropped; text without fences is returned trimmed.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(body) = fence_regex().captures(trimmed).and_then(|caps| caps.get(1)) {
        return body.as_str().trim().to_string();
    }

    match trimmed.strip_prefix("```") {
        Some(rest) => rest
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            .trim()
            .to_string(),
        None => trimmed.to_string(),
    }
}

/// Strip code fences and parse what is left as JSON
pub fn parse_json_reply(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(raw))
}
