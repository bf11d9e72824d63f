//! Dotted-path lookup over JSON documents.

use serde_json::Value;

/// Resolve a dot-notation path (e.g. `"core_assessment.risk_level"`) against
/// a JSON value.
///
/// Returns `None` when any segment is missing or the final value is `null`.
pub fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(v) if !v.is_null() => current = v,
            _ => return None,
        }
    }
    Some(current)
}

/// Like `resolve_path`, but only succeeds for non-empty strings.
pub fn resolve_str<'v>(value: &'v Value, path: &str) -> Option<&'v str> {
    resolve_path(value, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
