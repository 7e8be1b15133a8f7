//! Error types shared between the scraper and the client.
//!
//! `RateError` groups four pipeline failure classes. Transport failures
//! (`Transport`, `Status`, `Render`) are surfaced as soon as they happen and
//! are never retried. `ValidationExhausted` is raised by the fetch loop once
//! the retry budget is spent. `StructuralMismatch` and `NumericParse` come
//! from extraction. The remaining variants cover cancellation and the
//! configuration/output plumbing around the pipeline.
use std::io;

use thiserror::Error;

/// Unified error type for fetching, validating and extracting rates.
#[derive(Error, Debug)]
pub enum RateError {
    /// Connection, TLS, timeout or body read failure reported by the HTTP client.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The document source answered with a non-success HTTP status.
    #[error("Transport error: {url} answered with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },

    /// The in-page script rendering step failed or is not available.
    #[error("Render error: {0}")]
    Render(String),

    /// Every attempt was rejected by the validator.
    #[error("Failed to find valid data after {retries} retries")]
    ValidationExhausted {
        /// Configured retry budget that was spent.
        retries: u32,
    },

    /// An expected element or row shape was not found in the document.
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// A price cell could not be parsed as a decimal.
    #[error("Cannot parse {text:?} as a decimal: {source}")]
    NumericParse {
        /// Cell text as found in the document.
        text: String,
        /// Underlying decimal parser error.
        #[source]
        source: rust_decimal::Error,
    },

    /// The fetch was cancelled before it completed.
    #[error("Fetch cancelled")]
    Cancelled,

    /// The overall fetch deadline passed before valid data was found.
    #[error("Fetch deadline exceeded after {attempts} attempts")]
    DeadlineExceeded {
        /// Number of document source calls issued before giving up.
        attempts: u32,
    },

    /// A CSS selector used to address the document could not be compiled.
    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector {
        /// Selector source text.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// A caller-supplied request header is malformed.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The target URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A user-agent pool was configured without any entry.
    #[error("User-agent pool is empty")]
    EmptyUserAgentPool,

    /// A user-agent pool entry is blank or not a valid header value.
    #[error("Invalid user agent: {0:?}")]
    InvalidUserAgent(String),

    /// I/O error originating from the standard library or a child process.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding JSON output via serde_json.
    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl RateError {
    /// Returns `true` for failures reported by the document source itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RateError::Transport(_) | RateError::Status { .. } | RateError::Render(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_transport_class() {
        let err = RateError::Status {
            url: "https://example.test".to_string(),
            status: 503,
        };
        assert!(err.is_transport());
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_validation_exhausted_message_carries_retries() {
        let err = RateError::ValidationExhausted { retries: 10 };
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "Failed to find valid data after 10 retries");
    }
}
