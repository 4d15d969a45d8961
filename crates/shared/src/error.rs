use serde::Deserialize;

/// JSON error payload some backends attach to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "message")]
    pub error: String,
}

/// Best-effort human readable message from an error response body.
///
/// Accepts `{"error": ".."}` / `{"message": ".."}`, a bare JSON string, or
/// plain text. Returns `None` when nothing usable is present.
pub fn error_message_from_body(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(body) = serde_json::from_str::<ErrorBody>(trimmed) {
        let message = body.error.trim();
        return (!message.is_empty()).then(|| message.to_string());
    }
    if let Ok(serde_json::Value::String(message)) = serde_json::from_str(trimmed) {
        let message = message.trim();
        return (!message.is_empty()).then(|| message.to_string());
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        // JSON without a recognizable message field
        return None;
    }

    Some(trimmed.to_string())
}
