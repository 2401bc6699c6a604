//! Error types for spreadsheet store interactions
//!
//! Errors are classified by how the caller recovers:
//! - Credentials: fatal for the current store interaction, never retried
//! - RateLimited: recovered locally via the stale-cache fallback
//! - Everything else: surfaced per operation, the app keeps running

use thiserror::Error;

/// Errors from the spreadsheet backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Spreadsheet API rate limit exceeded")]
    RateLimited,

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when the store rejected the call for exceeding its request quota.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, StoreError::RateLimited)
    }

    /// True when the failure is a credential/configuration problem.
    pub fn is_credentials(&self) -> bool {
        matches!(self, StoreError::Credentials(_))
    }
}

/// Classify an API failure body. Google signals quota exhaustion either as
/// HTTP 429 or as a 403 whose body names the quota, so both are matched.
pub fn classify_api_error(status: u16, body: &str) -> StoreError {
    if status == 429 || body.contains("RATE_LIMIT_EXCEEDED") || body.contains("Quota exceeded") {
        return StoreError::RateLimited;
    }
    if status == 401 {
        return StoreError::Credentials("access token rejected".to_string());
    }
    if status == 400 && body.contains("Unable to parse range") {
        return StoreError::WorksheetNotFound(extract_range_name(body));
    }
    StoreError::Api {
        status,
        message: truncate_body(body),
    }
}

fn extract_range_name(body: &str) -> String {
    // Body looks like: "Unable to parse range: Pipeline!1:1"
    body.split("Unable to parse range:")
        .nth(1)
        .map(|s| s.trim().trim_end_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}
