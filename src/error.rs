//! Error taxonomy for the query pipeline, the abstract fetcher and the
//! source adapters.
//!
//! Two outcomes are deliberately *not* errors:
//! - an abstract lookup that exhausted its retries or hit an unknown id
//!   resolves to [`crate::models::AbstractLookup::NotFound`];
//! - a filter run with no surviving records is an empty result.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single HTTP exchange, or of the retry loop around it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote answered 503. Transient; the retry loop waits and tries again.
    #[error("service unavailable (retry-after: {retry_after:?})")]
    Unavailable { retry_after: Option<Duration> },

    /// Any other non-success status. Fatal.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// Connection, TLS, timeout or body decoding failure. Fatal.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Every attempt came back 503.
    #[error("service still unavailable after {attempts} attempts")]
    Exhausted { attempts: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed date, keyword expression, article id or argument.
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The remote document could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<quick_xml::DeError> for Error {
    fn from(e: quick_xml::DeError) -> Self {
        Error::Malformed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message() {
        let err = FetchError::Exhausted { attempts: 5 };
        assert_eq!(err.to_string(), "service still unavailable after 5 attempts");
    }

    #[test]
    fn test_fetch_error_converts_into_error() {
        let err: Error = FetchError::Status(500).into();
        assert!(matches!(err, Error::Fetch(FetchError::Status(500))));
        assert_eq!(err.to_string(), "unexpected HTTP status 500");
    }

    #[test]
    fn test_invalid_criteria_message() {
        let err = Error::InvalidCriteria("bad date '32.01'".into());
        assert_eq!(err.to_string(), "invalid criteria: bad date '32.01'");
    }
}
