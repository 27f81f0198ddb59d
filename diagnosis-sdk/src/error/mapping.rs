//! Error mapping for backend HTTP responses
//!
//! Converts non-2xx responses from the diagnosis backend into the normalized
//! [`DiagnosisError`] type.

use reqwest::StatusCode;
use serde_json::Value;

use super::{DiagnosisError, ErrorContext};
use crate::util::truncate_string;

/// Longest body excerpt copied into an error message
const MAX_BODY_EXCERPT: usize = 100;

/// Map a backend HTTP error to a DiagnosisError
///
/// The backend reports failures as `{"error": "..."}` (and occasionally
/// `{"message": "..."}`); anything else falls back to the status line plus a
/// truncated body.
pub fn map_http_error(status: StatusCode, body: &str, context: &mut ErrorContext) -> DiagnosisError {
    context.error_code = Some(classify_http_error(status).to_string());

    let message = match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("error")
            .or_else(|| json.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| status_message(status, body)),
        Err(_) => status_message(status, body),
    };

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => DiagnosisError::validation(message),
        StatusCode::NOT_FOUND => DiagnosisError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => DiagnosisError::timeout(message),
        _ => DiagnosisError::service(message),
    }
}

fn status_message(status: StatusCode, body: &str) -> String {
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, truncate_string(body, MAX_BODY_EXCERPT))
    }
}

/// Helper function to classify HTTP errors by category
pub fn classify_http_error(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 | 422 => "validation",
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        408 | 504 => "timeout",
        429 => "rate_limit",
        500..=599 => "server",
        _ => "unknown",
    }
}
