//! Named-placeholder template rendering
//!
//! Templates use `{name}` placeholders; `{{` and `}}` produce literal braces.

use crate::error::{AppError, Result};

enum Token<'a> {
    Literal(&'a str),
    Brace(char),
    Placeholder(&'a str),
}

fn tokenize(template: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        if pos > 0 {
            tokens.push(Token::Literal(&rest[..pos]));
        }
        let brace = rest.as_bytes()[pos] as char;
        let after = &rest[pos + 1..];

        if after.starts_with(brace) {
            tokens.push(Token::Brace(brace));
            rest = &after[1..];
            continue;
        }

        if brace == '}' {
            return Err(AppError::Template(format!(
                "single '}}' encountered at offset {}",
                template.len() - rest.len() + pos
            )));
        }

        let end = after.find('}').ok_or_else(|| {
            AppError::Template("unterminated '{' in template".to_string())
        })?;
        let name = after[..end].trim();
        if name.is_empty() || name.contains('{') {
            return Err(AppError::Template(format!(
                "invalid placeholder '{{{}}}'",
                &after[..end]
            )));
        }
        tokens.push(Token::Placeholder(name));
        rest = &after[end + 1..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Literal(rest));
    }
    Ok(tokens)
}

/// Names of all placeholders referenced by a template, in order of first use
pub fn placeholders(template: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for token in tokenize(template)? {
        if let Token::Placeholder(name) = token {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Substitute `vars` into `template`; a placeholder without a value is an error
pub fn render(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    for token in tokenize(template)? {
        match token {
            Token::Literal(s) => out.push_str(s),
            Token::Brace(c) => out.push(c),
            Token::Placeholder(name) => {
                let value = vars
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| {
                        AppError::Template(format!("missing value for placeholder '{}'", name))
                    })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}
