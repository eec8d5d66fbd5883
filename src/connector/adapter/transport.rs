use crate::domain::DomainError;

/// Maps a failed `send()` into the execution error taxonomy.
pub(crate) fn request_error(client: &str, url: &str, e: reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::timeout(format!("{client}: no response from {url}: {e}"))
    } else if e.is_connect() {
        DomainError::unavailable(format!("{client}: cannot reach {url}: {e}"))
    } else {
        DomainError::upstream(format!("{client}: request failed: {e}"))
    }
}

/// Pulls a readable message out of an error body, falling back to the raw text.
pub(crate) fn error_detail(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });

    message.unwrap_or_else(|| body.trim().chars().take(200).collect())
}
