//! Recovers a single JSON object from free-form oracle text.
//!
//! Repair stages run in a fixed order and each one only runs when the text
//! produced so far still fails to parse:
//!
//! 1. strip markdown code fences,
//! 2. keep the span from the first `{` to the last `}`,
//! 3. drop trailing commas before `}` / `]`,
//! 4. drop `//` and `/* */` comments, then drop trailing commas again.
//!
//! When nothing parses, the error keeps both the raw and the cleaned text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::oracle::error::{OracleError, malformed_response};

static LEADING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n?").expect("leading fence pattern is valid")
});
static TRAILING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r?\n?[ \t]*```[ \t]*$").expect("trailing fence pattern is valid")
});
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no recoverable JSON object in oracle response: {reason}")]
pub struct MalformedResponse {
    pub raw: String,
    pub cleaned: String,
    pub reason: String,
}

impl From<MalformedResponse> for OracleError {
    fn from(err: MalformedResponse) -> Self {
        malformed_response(format!(
            "{}; raw={:?}",
            err,
            err.raw.chars().take(240).collect::<String>()
        ))
    }
}

pub fn normalize(raw: &str) -> Result<Value, MalformedResponse> {
    let mut cleaned = strip_code_fences(raw.trim());
    if let Ok(value) = parse_object(&cleaned) {
        return Ok(value);
    }

    if let Some(span) = outermost_object_span(&cleaned) {
        cleaned = span.to_string();
        if let Ok(value) = parse_object(&cleaned) {
            return Ok(value);
        }
    }

    cleaned = remove_trailing_commas(&cleaned);
    if let Ok(value) = parse_object(&cleaned) {
        return Ok(value);
    }

    cleaned = remove_trailing_commas(&strip_comments(&cleaned));
    parse_object(&cleaned).map_err(|reason| MalformedResponse {
        raw: raw.to_string(),
        cleaned,
        reason,
    })
}

/// Non-empty trimmed string value of `key`, if any.
pub fn string_field(object: &Value, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_object(text: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_type_name(&other))),
        Err(err) => Err(err.to_string()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn strip_code_fences(text: &str) -> String {
    let without_leading = LEADING_FENCE.replace(text, "");
    TRAILING_FENCE
        .replace(&without_leading, "")
        .trim()
        .to_string()
}

fn outermost_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn remove_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Removes comments outside string literals so URLs inside values survive.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match (ch, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            _ => out.push(ch),
        }
    }

    out
}
