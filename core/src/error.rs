//! Error types for the REST client.
//!
//! # Design
//! `RequestError` is the only error a caller ever sees. It has four kinds:
//! two dedicated status codes, a catch-all for other 4xx/5xx responses, and
//! a transport failure where no response arrived at all.
//! `TransportError` carries the underlying detail for logging and is always
//! collapsed into `RequestError::ConnectionFailure` before a callback runs.

/// Outcome classification delivered through a `Completion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The server returned 401.
    #[error("unauthorized")]
    Unauthorized,

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned any other status in 400..=599.
    #[error("server error")]
    ServerError,

    /// No response was received.
    #[error("connection failure")]
    ConnectionFailure,
}

impl RequestError {
    /// Map a status code to an error kind, or `None` for success.
    ///
    /// Anything outside 400..=599 is a success, including 1xx and 3xx.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(RequestError::Unauthorized),
            404 => Some(RequestError::NotFound),
            400..=599 => Some(RequestError::ServerError),
            _ => None,
        }
    }
}

/// Failures raised by a `Transport` before any response is available.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("{0}")]
    Other(String),
}
