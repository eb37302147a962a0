//! Error types for the gateway client.

use std::time::Duration;
use thiserror::Error;


/// Client error types.
///
/// Application-level failures signaled by the backend are not errors at this
/// layer: they arrive as an [`Envelope`](crate::Envelope) with
/// `success == false`. [`Error::Application`] only appears once a caller opts
/// into `Result` handling through [`Envelope::into_result`](crate::Envelope::into_result).
#[derive(Debug, Error)]
pub enum Error {
    /// The request never reached the server or the response never came back
    /// (DNS, refused connection, timeout, aborted body).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with HTTP 429.
    #[error(
        "rate limited (retry after: {})",
        .retry_after.as_deref().unwrap_or("unspecified")
    )]
    RateLimited {
        /// Raw `Retry-After` header value, if the server sent one.
        retry_after: Option<String>,
    },

    /// The backend reported a failure.
    #[error("API error ({status}): {message}")]
    Application {
        /// HTTP status code.
        status: u16,
        /// Error message from the backend, or a status-derived fallback.
        message: String,
    },

    /// The caller cancelled the request before it settled.
    #[error("request cancelled")]
    Cancelled,

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be built (headers, body, file part).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading a local file for upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for failures where no HTTP response was obtained.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if the transport failure was a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }

    /// Returns the `Retry-After` hint as a delay, when it was given in
    /// delta-seconds form.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after: Some(value),
            } => value.trim().parse::<u64>().ok().map(Duration::from_secs),
            _ => None,
        }
    }
}
