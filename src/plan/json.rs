//! JSON Extraction
//!
//! Providers sometimes answer with a JSON object instead of headed prose,
//! often wrapped in a Markdown code fence or carrying trailing commas. This
//! module recovers the object when there is one.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static TRAILING_COMMA: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])"));

/// Extract a JSON object from raw provider output
///
/// Returns `None` unless the trimmed text (after removing an optional code
/// fence) is itself an object; prose that merely mentions braces stays prose.
pub fn extract_object(raw: &str) -> Option<Map<String, Value>> {
    let body = strip_code_fence(raw.trim());
    if !body.starts_with('{') {
        return None;
    }
    let end = body.rfind('}')?;
    let candidate = &body[..=end];

    parse_object(candidate).or_else(|| parse_object(&remove_trailing_commas(candidate)))
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Strip a surrounding ``` or ```json fence
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the info string on the opening line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn remove_trailing_commas(text: &str) -> String {
    match TRAILING_COMMA.as_ref() {
        Ok(re) => re.replace_all(text, "$1").into_owned(),
        Err(_) => text.to_string(),
    }
}
