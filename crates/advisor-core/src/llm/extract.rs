//! Best-effort extraction of a JSON object embedded in model output

use serde_json::Value;

/// Locate the outermost JSON object in `content`.
///
/// Markdown code fences are stripped first; then the slice from the first
/// `{` to the last `}` is returned. Returns `None` when no braces are found.
pub fn extract_json_object(content: &str) -> Option<&str> {
    let clean = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let start = clean.find('{')?;
    let end = clean.rfind('}')?;
    if end < start {
        return None;
    }
    clean.get(start..=end)
}

/// Extract and parse the embedded JSON object as a [`Value`]
pub fn parse_json_object(content: &str) -> Option<Value> {
    let candidate = extract_json_object(content)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}
