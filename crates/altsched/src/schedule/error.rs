//! Error types for the schedule pipeline.

use thiserror::Error;

/// Errors from the outbound document request.
#[derive(Debug, Error, Clone)]
pub enum FetchError {
    /// Connect or read timeout elapsed
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (DNS, refused, reset, ...)
    #[error("network error: {message}")]
    Network { message: String },

    /// Server answered with a non-2xx status
    #[error("server returned HTTP {status}")]
    Http { status: u16 },
}

impl FetchError {
    /// Returns true if this error is potentially transient and retryable.
    pub fn is_retryable(&self) -> bool {
        // Everything the fetcher classifies is worth another attempt; the
        // retry budget is what bounds it.
        true
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
            }
        } else {
            FetchError::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Errors from turning raw markup into a schedule tree.
#[derive(Debug, Error, Clone)]
pub enum ExtractError {
    /// No week headings anywhere in the document - treated as a full parse
    /// failure by the caller
    #[error("no week headings found in document")]
    NoWeeksFound,

    /// The group has no entry in the source mapping; no fetch is attempted
    #[error("unknown group: {group}")]
    UnknownGroup { group: String },

    /// A week heading matched but yielded no usable number. Recoverable:
    /// the extractor skips the heading and never surfaces this variant.
    #[error("malformed heading: '{text}'")]
    MalformedHeading { text: String },
}

/// Umbrella error for the fetch/extract pipeline.
#[derive(Debug, Error, Clone)]
pub enum ScheduleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}
