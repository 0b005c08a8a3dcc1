//! Error taxonomy for the adapter.
//!
//! # Responsibilities
//! - Classify handler failures (timeout vs. everything else)
//! - Describe failures while turning a response back into wire output
//! - Render a diagnostic trace suitable for a 500 response body
//!
//! # Design Decisions
//! - One explicit `Timeout` kind; no matching on type names
//! - Diagnostic trace walks the `source()` chain

use std::error::Error as StdError;
use std::fmt::Write as _;

use thiserror::Error;

/// Boxed error used for body streams and opaque handler failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Coarse classification of a handler failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The handler (or an upstream call it made) gave up waiting.
    Timeout,
    /// Any other failure.
    Other,
}

impl ErrorKind {
    /// Name used as the first word of a diagnostic trace.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Other => "Error",
        }
    }
}

/// Errors raised while building or handling an abstract request.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler or its upstream timed out.
    #[error("operation timed out")]
    Timeout(#[source] BoxError),

    /// The inbound request target could not be turned into an absolute URL.
    #[error("malformed request URL '{target}'")]
    MalformedUrl {
        target: String,
        #[source]
        source: url::ParseError,
    },

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// Anything else the handler reported.
    #[error(transparent)]
    Other(BoxError),
}

impl HandlerError {
    /// Wrap an arbitrary error as a timeout.
    pub fn timeout<E: Into<BoxError>>(err: E) -> Self {
        HandlerError::Timeout(err.into())
    }

    /// Wrap an arbitrary error as a generic failure.
    pub fn other<E: Into<BoxError>>(err: E) -> Self {
        HandlerError::Other(err.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HandlerError::Timeout(_) => ErrorKind::Timeout,
            _ => ErrorKind::Other,
        }
    }

    /// Full diagnostic trace, e.g. `Error: boom\n    caused by: ...`.
    pub fn diagnostic(&self) -> String {
        diagnostic_with_kind(self.kind(), self)
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            HandlerError::Timeout(err.into())
        } else {
            HandlerError::Other(err.into())
        }
    }
}

impl From<tokio::time::error::Elapsed> for HandlerError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        HandlerError::Timeout(err.into())
    }
}

impl From<reqwest::Error> for HandlerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HandlerError::Timeout(err.into())
        } else {
            HandlerError::Other(err.into())
        }
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        HandlerError::Other(err)
    }
}

impl From<String> for HandlerError {
    fn from(msg: String) -> Self {
        HandlerError::Other(msg.into())
    }
}

impl From<&str> for HandlerError {
    fn from(msg: &str) -> Self {
        HandlerError::Other(msg.into())
    }
}

/// Errors raised while converting an abstract response into a native one.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    #[error("invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("invalid value for header '{name}'")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: axum::http::header::InvalidHeaderValue,
    },
}

impl WriteError {
    pub fn diagnostic(&self) -> String {
        diagnostic_with_kind(ErrorKind::Other, self)
    }
}

/// Errors raised while bootstrapping the listener.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {host}:{port}")]
    Bind {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read bound address")]
    LocalAddr(#[source] std::io::Error),
}

/// Render a diagnostic trace for any error.
pub fn diagnostic(err: &(dyn StdError + 'static)) -> String {
    diagnostic_with_kind(ErrorKind::Other, err)
}

fn diagnostic_with_kind(kind: ErrorKind, err: &(dyn StdError + 'static)) -> String {
    let mut out = String::from(kind.name());
    let message = err.to_string();
    if !message.is_empty() {
        let _ = write!(out, ": {}", message);
    }
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\n    caused by: {}", cause);
        source = cause.source();
    }
    out
}
