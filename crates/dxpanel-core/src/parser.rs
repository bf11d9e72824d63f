//! Agent response parser.
//!
//! Generated text often arrives wrapped in a Markdown code fence. The parser
//! strips the fence, then requires the remainder to be a JSON object. Failure
//! is a value (`ParseError`), never a panic.

use serde_json::Value;

use dxpanel_contracts::{
    assessment::{Analysis, RawTextFallback, StructuredAnalysis},
    error::ParseError,
};

const FENCE: &str = "```";

/// Remove surrounding whitespace and a Markdown code fence, if present.
///
/// Handles "```json", "```JSON", bare "```" openers and a trailing "```".
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        // Drop an info string such as "json" when it sits on the fence line.
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = if rest[..tag_len].eq_ignore_ascii_case("json") {
            &rest[tag_len..]
        } else {
            rest
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
        text = rest;
    }
    text.trim()
}

/// Parse generated text into a structured analysis.
pub fn parse(raw: &str) -> Result<StructuredAnalysis, ParseError> {
    let cleaned = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(cleaned).map_err(|e| ParseError::NotJson(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

/// Parse generated text, converting failure into a `RawTextFallback`.
pub fn parse_or_fallback(raw: &str) -> Analysis {
    match parse(raw) {
        Ok(map) => Analysis::Structured(map),
        Err(e) => Analysis::RawText(RawTextFallback::new(raw, e.to_string())),
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
