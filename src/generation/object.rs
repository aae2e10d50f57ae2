//! Structured output: parse typed objects out of model replies.

use serde::de::DeserializeOwned;

use crate::error::ParleyError;

/// Parse a JSON object of type `T` out of free-form model output.
///
/// Accepts a bare object, one wrapped in markdown code fences, or the first
/// `{ ... }` span embedded in surrounding prose.
pub fn parse_object<T: DeserializeOwned>(raw: &str, type_name: &str) -> Result<T, ParleyError> {
    let json_text = strip_code_fences(raw);
    if let Ok(object) = serde_json::from_str::<T>(&json_text) {
        return Ok(object);
    }

    embedded_object(&json_text)
        .and_then(|span| serde_json::from_str::<T>(span).ok())
        .ok_or_else(|| ParleyError::parse(type_name, raw))
}

/// Strip markdown code fences from a JSON response.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        let without_opening = if let Some(rest) = trimmed.strip_prefix("```json") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("```") {
            rest
        } else {
            trimmed
        };
        if let Some(stripped) = without_opening.strip_suffix("```") {
            return stripped.trim().to_string();
        }
        return without_opening.trim().to_string();
    }
    trimmed.to_string()
}

fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
