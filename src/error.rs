use serde_json::Value;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, ApiError>;

/// Every failure the client can surface.
///
/// HTTP failures are classified by status code; the remaining variants cover
/// local conditions (timeouts, validation, transport, cancellation).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        error_code: Option<String>,
    },

    #[error("Insufficient credits: {message}")]
    InsufficientCredits {
        message: String,
        error_code: Option<String>,
    },

    #[error("Invalid request (HTTP {status}): {message}")]
    InvalidRequest {
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    #[error("No captions available: {message}")]
    NoCaptions {
        message: String,
        error_code: Option<String>,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        error_code: Option<String>,
        retry_after: Option<f64>,
    },

    #[error("Server error (HTTP {status}): {message}")]
    Server {
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// Classify a non-success response from its status code and JSON body.
    pub fn from_response(status: u16, body: &Value) -> Self {
        let message = error_message(status, body);
        let error_code = body
            .get("error_code")
            .and_then(Value::as_str)
            .map(str::to_string);

        match status {
            401 => ApiError::Authentication { message, error_code },
            402 => ApiError::InsufficientCredits { message, error_code },
            404 => ApiError::NoCaptions { message, error_code },
            429 => ApiError::RateLimit {
                message,
                error_code,
                retry_after: body.get("retry_after").and_then(lenient_f64),
            },
            500..=u16::MAX => ApiError::Server {
                status,
                message,
                error_code,
            },
            _ => ApiError::InvalidRequest {
                status,
                message,
                error_code,
            },
        }
    }

    /// HTTP status associated with this failure, when one exists
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { .. } => Some(401),
            ApiError::InsufficientCredits { .. } => Some(402),
            ApiError::NoCaptions { .. } => Some(404),
            ApiError::RateLimit { .. } => Some(429),
            ApiError::InvalidRequest { status, .. } | ApiError::Server { status, .. } => {
                Some(*status)
            }
            ApiError::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Machine-readable `error_code` reported by the API, if any
    pub fn error_code(&self) -> Option<&str> {
        match self {
            ApiError::Authentication { error_code, .. }
            | ApiError::InsufficientCredits { error_code, .. }
            | ApiError::InvalidRequest { error_code, .. }
            | ApiError::NoCaptions { error_code, .. }
            | ApiError::RateLimit { error_code, .. }
            | ApiError::Server { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }

    /// Seconds the API asked us to wait before retrying
    pub fn retry_after(&self) -> Option<f64> {
        match self {
            ApiError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Timeouts and 5xx responses are the only failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Server { .. } => true,
            ApiError::Api {
                status: Some(status),
                ..
            } => *status >= 500,
            _ => false,
        }
    }
}

/// `message`, then `error`, then a synthesized fallback.
fn error_message(status: u16, body: &Value) -> String {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("API error {}", status))
}

/// Numbers, or strings holding numbers.
pub(crate) fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        let body = json!({"message": "nope"});

        assert!(matches!(
            ApiError::from_response(401, &body),
            ApiError::Authentication { .. }
        ));
        assert!(matches!(
            ApiError::from_response(402, &body),
            ApiError::InsufficientCredits { .. }
        ));
        assert!(matches!(
            ApiError::from_response(404, &body),
            ApiError::NoCaptions { .. }
        ));
        assert!(matches!(
            ApiError::from_response(429, &body),
            ApiError::RateLimit { .. }
        ));
        assert!(matches!(
            ApiError::from_response(500, &body),
            ApiError::Server { status: 500, .. }
        ));
        assert!(matches!(
            ApiError::from_response(503, &body),
            ApiError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ApiError::from_response(400, &body),
            ApiError::InvalidRequest { status: 400, .. }
        ));
        assert!(matches!(
            ApiError::from_response(422, &body),
            ApiError::InvalidRequest { status: 422, .. }
        ));
    }

    #[test]
    fn test_rate_limit_carries_retry_after() {
        let err = ApiError::from_response(429, &json!({"error": "slow down", "retry_after": 30}));
        assert_eq!(err.retry_after(), Some(30.0));
        assert_eq!(err.to_string(), "Rate limit exceeded: slow down");

        let err = ApiError::from_response(429, &json!({"retry_after": "12.5"}));
        assert_eq!(err.retry_after(), Some(12.5));

        let err = ApiError::from_response(429, &json!({}));
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_message_extraction_order() {
        let err = ApiError::from_response(400, &json!({"message": "first", "error": "second"}));
        assert!(err.to_string().ends_with("first"));

        let err = ApiError::from_response(400, &json!({"error": "second"}));
        assert!(err.to_string().ends_with("second"));

        let err = ApiError::from_response(418, &json!({"detail": "ignored"}));
        assert!(err.to_string().ends_with("API error 418"));
    }

    #[test]
    fn test_error_code_preserved() {
        let err = ApiError::from_response(
            402,
            &json!({"message": "top up", "error_code": "CREDITS_EXHAUSTED"}),
        );
        assert_eq!(err.error_code(), Some("CREDITS_EXHAUSTED"));
        assert_eq!(err.status_code(), Some(402));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ApiError::Timeout("slow".into()).is_retryable());
        assert!(ApiError::from_response(502, &json!({})).is_retryable());
        assert!(ApiError::Api {
            status: Some(503),
            message: "API error 503: <html>".into()
        }
        .is_retryable());

        assert!(!ApiError::from_response(429, &json!({})).is_retryable());
        assert!(!ApiError::from_response(401, &json!({})).is_retryable());
        assert!(!ApiError::Transport("refused".into()).is_retryable());
        assert!(!ApiError::Validation("bad".into()).is_retryable());
    }
}
