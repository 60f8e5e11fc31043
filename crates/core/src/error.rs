//! Unified error types for docshelf.
//!
//! Display strings carry a stable `CODE:` prefix so adapters and logs can
//! match on the failure class without downcasting.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the docshelf core and client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Search query failed validation (over-length).
    #[error("INVALID_QUERY: {0}")]
    InvalidQuery(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// A single fetch attempt exceeded its timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Connection-level failure before a response arrived.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Non-2xx HTTP response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Every attempt failed and no cached bytes exist for the key.
    #[error("FETCH_EXHAUSTED: {url} after {attempts} attempts: {last_error}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        #[source]
        last_error: Box<Error>,
    },

    /// The caller cancelled the fetch.
    #[error("CANCELLED: {0}")]
    Cancelled(String),

    /// Seed index could not be read or parsed.
    #[error("SEED_LOAD_FAILED: {0}")]
    SeedLoad(String),
}

impl Error {
    /// Whether the fetcher should spend another attempt after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::FetchTimeout(_) | Error::Network(_) | Error::HttpError(_))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidQuery(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::Network(msg) => (-32008, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::FetchExhausted { .. } => (-32009, err.to_string()),
            Error::Cancelled(msg) => (-32010, msg.clone()),
            Error::SeedLoad(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidQuery("query too long".to_string());
        assert!(err.to_string().contains("INVALID_QUERY"));
        assert!(err.to_string().contains("query too long"));
    }

    #[test]
    fn test_exhausted_carries_last_error() {
        let err = Error::FetchExhausted {
            url: "https://example.com/buttons".to_string(),
            attempts: 3,
            last_error: Box::new(Error::FetchTimeout("10000ms".to_string())),
        };
        let text = err.to_string();
        assert!(text.starts_with("FETCH_EXHAUSTED"));
        assert!(text.contains("3 attempts"));
        assert!(text.contains("FETCH_TIMEOUT"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_retryable_classes() {
        assert!(Error::FetchTimeout("t".into()).is_retryable());
        assert!(Error::Network("n".into()).is_retryable());
        assert!(Error::HttpError("status 503".into()).is_retryable());
        assert!(!Error::InvalidUrl("u".into()).is_retryable());
        assert!(!Error::Cancelled("c".into()).is_retryable());
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::InvalidQuery("too long".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32602);
    }
}
