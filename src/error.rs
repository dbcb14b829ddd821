//! memogate error types

use std::fmt;

use crate::types::Response;

/// Sub-kind of a transport-level failure.
///
/// Distinguished so callers can apply different retry policies: a refused
/// connection and a slow upstream usually deserve different treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Could not establish a connection (DNS, refused, TLS handshake).
    Connect,
    /// The request or response exceeded the client timeout.
    Timeout,
    /// The redirect limit was exceeded.
    Redirect,
    /// Any other request failure (body read, protocol error, ...).
    Request,
}

impl TransportErrorKind {
    /// Classify a `reqwest` error.
    ///
    /// Timeouts are checked first: a connect timeout reports both
    /// `is_timeout()` and `is_connect()`.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_redirect() {
            Self::Redirect
        } else {
            Self::Request
        }
    }

    /// Short label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Redirect => "redirect",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// memogate error types
#[derive(Debug, thiserror::Error)]
pub enum MemogateError {
    // Call failures (classified by the response gate)
    #[error("{kind} error for {path}: {message}")]
    Transport {
        kind: TransportErrorKind,
        path: String,
        message: String,
    },

    #[error("HTTP {status} for {path}")]
    Status {
        status: u16,
        path: String,
        response: Box<Response>,
    },

    // Argument errors, raised before any network or store access
    #[error("fingerprint error: {0}")]
    Fingerprint(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    // Store adapter errors
    #[error("store error: {0}")]
    Store(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("decode error: {0}")]
    Decode(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MemogateError {
    /// Whether retrying the same call may succeed.
    ///
    /// Connection failures, timeouts, `429 Too Many Requests` and 5xx
    /// statuses are transient. Everything else (4xx, bad arguments,
    /// decoding problems) will fail again the same way.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { kind, .. } => {
                matches!(kind, TransportErrorKind::Connect | TransportErrorKind::Timeout)
            }
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status of an application-level failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The failed response, for callers that want to inspect its body.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Transport failure sub-kind, if this is a transport failure.
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this error came out of the response gate (the underlying
    /// call was attempted and failed).
    pub fn is_call_failure(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}

/// Result type alias for memogate operations
pub type Result<T> = std::result::Result<T, MemogateError>;
