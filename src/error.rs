//! Error types for video generation.

use std::time::Duration;

/// Errors that can occur during video generation.
#[derive(Debug, thiserror::Error)]
pub enum VidGenError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay suggested by the `Retry-After` header, if present.
        retry_after: Option<Duration>,
    },

    /// Polling budget exhausted before the job reached a terminal state.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid request parameters (prompt, duration, style, resolution).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Vendor reported the generation job as failed.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// Vendor response violated the expected protocol (missing job id,
    /// missing artifact URL, unrecognized status string).
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Downloaded payload is too small to be a real video.
    #[error("downloaded payload too small: {got} bytes (minimum {min})")]
    UndersizedPayload {
        /// Bytes actually received.
        got: usize,
        /// Smallest payload accepted as real video.
        min: usize,
    },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to encode placeholder media.
    #[error("failed to encode placeholder: {0}")]
    Encode(String),

    /// No client configured for the requested provider.
    #[error("provider not available: {0}")]
    ProviderNotAvailable(String),
}

impl VidGenError {
    /// Returns true if this error is likely transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_)
        )
    }

    /// Returns true if the error came from request validation and must be
    /// surfaced to the caller rather than substituted with fallback content.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::Timeout(_) => Some(Duration::from_secs(1)),
            Self::Network(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Result type alias for video generation operations.
pub type Result<T> = std::result::Result<T, VidGenError>;

/// Parses the `Retry-After` header as whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Reduces a raw error body to something safe to log and display: extracts
/// the vendor's message field when the body is JSON, strips control
/// characters, and truncates.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    const MAX_LEN: usize = 500;

    let message = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| match v.get(key) {
                    Some(serde_json::Value::String(s)) => Some(s.clone()),
                    Some(other) if !other.is_null() => Some(other.to_string()),
                    _ => None,
                })
        })
        .unwrap_or_else(|| text.to_string());

    let cleaned: String = message
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect();
    let trimmed = cleaned.trim();

    if trimmed.len() > MAX_LEN {
        let mut end = MAX_LEN;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(VidGenError::RateLimited { retry_after: None }.is_retryable());
        assert!(VidGenError::Timeout(Duration::from_secs(30)).is_retryable());

        assert!(!VidGenError::Auth("bad key".into()).is_retryable());
        assert!(!VidGenError::InvalidRequest("prompt too short".into()).is_retryable());
        assert!(!VidGenError::Protocol("unknown status".into()).is_retryable());
        assert!(!VidGenError::UndersizedPayload { got: 12, min: 1000 }.is_retryable());
    }

    #[test]
    fn test_is_validation() {
        assert!(VidGenError::InvalidRequest("too short".into()).is_validation());
        assert!(!VidGenError::GenerationFailed("oops".into()).is_validation());
        assert!(!VidGenError::Timeout(Duration::from_secs(1)).is_validation());
    }

    #[test]
    fn test_retry_after() {
        let rate_limited = VidGenError::RateLimited {
            retry_after: Some(Duration::from_secs(60)),
        };
        assert_eq!(rate_limited.retry_after(), Some(Duration::from_secs(60)));

        let timeout = VidGenError::Timeout(Duration::from_secs(30));
        assert_eq!(timeout.retry_after(), Some(Duration::from_secs(1)));

        let auth = VidGenError::Auth("bad".into());
        assert_eq!(auth.retry_after(), None);
    }

    #[test]
    fn test_error_display() {
        let err = VidGenError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = VidGenError::UndersizedPayload { got: 42, min: 1000 };
        assert_eq!(
            err.to_string(),
            "downloaded payload too small: 42 bytes (minimum 1000)"
        );
    }

    #[test]
    fn test_sanitize_extracts_json_message() {
        let body = r#"{"message": "Invalid prompt", "code": 422}"#;
        assert_eq!(sanitize_error_message(body), "Invalid prompt");

        let body = r#"{"error": "quota exceeded"}"#;
        assert_eq!(sanitize_error_message(body), "quota exceeded");
    }

    #[test]
    fn test_sanitize_passes_plain_text() {
        assert_eq!(sanitize_error_message("  bad gateway \r"), "bad gateway");
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let long = "x".repeat(2000);
        let out = sanitize_error_message(&long);
        assert!(out.len() <= 503);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(reqwest::header::RETRY_AFTER, "30".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(30));
    }
}
