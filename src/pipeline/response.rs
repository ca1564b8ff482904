//! Best-effort repair of the model's JSON answer.
//!
//! Models wrap JSON in code fences, open with "Here's the extracted
//! content:", break long strings across lines, leave trailing commas or
//! answer with Python-style single quotes. Each rule below handles one of
//! those; anything still unparseable becomes
//! [`PosterError::MalformedResponse`].

use crate::content::{ExtractedContent, Field};
use crate::error::{PopulateWarning, PosterError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// Characters of the raw response quoted in parse errors.
const PREVIEW_CHARS: usize = 200;

static RE_OPEN_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```[a-z]*[ \t]*\r?\n?").unwrap());

static RE_CLOSE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n?```\s*$").unwrap());

/// Parse a model response into poster content.
///
/// References, when present, are tidied with
/// [`crate::content::clean_references`].
pub fn parse_response(raw: &str) -> Result<(ExtractedContent, Vec<PopulateWarning>), PosterError> {
    let value = parse_json_object(raw)?;
    let has_references = value.get(Field::References.key()).is_some();
    let (mut content, warnings) = ExtractedContent::from_value(value);
    if has_references {
        content.clean_references();
    }
    Ok((content, warnings))
}

/// Repair and parse `raw` into a JSON value.
pub fn parse_json_object(raw: &str) -> Result<Value, PosterError> {
    let candidate = isolate_object(&strip_fences(raw));
    let repaired = repair_json(&candidate);

    let first_err = match serde_json::from_str::<Value>(&repaired) {
        Ok(v) => return Ok(v),
        Err(e) => e,
    };
    debug!("JSON parse failed ({}), trying single-quote repair", first_err);

    let requoted = repair_json(&single_to_double_quotes(&candidate));
    serde_json::from_str::<Value>(&requoted).map_err(|_| {
        warn!("Unparseable extraction response ({} chars)", raw.len());
        PosterError::MalformedResponse {
            detail: first_err.to_string(),
            preview: raw.trim().chars().take(PREVIEW_CHARS).collect(),
        }
    })
}

/// Remove a leading ```` ```json ```` (or any language tag) and a trailing
/// ```` ``` ````.
pub fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_open = RE_OPEN_FENCE.replace(trimmed, "");
    RE_CLOSE_FENCE.replace(&without_open, "").trim().to_string()
}

/// Cut any chatter before the first `{` and after the last `}`.
fn isolate_object(text: &str) -> String {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => text[start..=end].to_string(),
        (Some(start), _) => text[start..].to_string(),
        _ => text.to_string(),
    }
}

/// Fold raw line breaks inside string literals into spaces and drop
/// trailing commas before `}` or `]`.
fn repair_json(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    out.push(c);
                }
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\r' => {}
                '\n' => {
                    if !out.ends_with(' ') {
                        out.push(' ');
                    }
                }
                _ => out.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Rewrite single-quoted strings as double-quoted ones, escaping embedded
/// double quotes. Double-quoted strings are copied unchanged.
fn single_to_double_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            None => match c {
                '\'' => {
                    quote = Some('\'');
                    out.push('"');
                }
                '"' => {
                    quote = Some('"');
                    out.push('"');
                }
                _ => out.push(c),
            },
            Some(q) => match c {
                '\\' => match chars.next() {
                    Some('\'') if q == '\'' => out.push('\''),
                    Some(n) => {
                        out.push('\\');
                        out.push(n);
                    }
                    None => out.push('\\'),
                },
                '"' if q == '\'' => out.push_str("\\\""),
                _ if c == q => {
                    quote = None;
                    out.push('"');
                }
                _ => out.push(c),
            },
        }
    }
    out
}
