//! The value handed to a completion callback.

use std::borrow::Cow;

use crate::error::RequestError;
use crate::http::{Headers, HttpResponse};

/// Outcome of a single request.
///
/// With a response, `status`, `headers` and `body` are all present, and
/// `error` is set only when the status classifies as an error. With no
/// response, only `error` is set, to `ConnectionFailure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub error: Option<RequestError>,
    pub status: Option<u16>,
    pub headers: Option<Headers>,
    pub body: Option<Vec<u8>>,
}

impl Completion {
    pub fn connection_failure() -> Self {
        Self {
            error: Some(RequestError::ConnectionFailure),
            status: None,
            headers: None,
            body: None,
        }
    }

    pub fn from_response(response: HttpResponse) -> Self {
        Self {
            error: RequestError::from_status(response.status),
            status: Some(response.status),
            headers: Some(response.headers),
            body: Some(response.body),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        self.body.as_deref().map(String::from_utf8_lossy)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Completion callback that discards the outcome.
pub fn ignore(_: Completion) {}
