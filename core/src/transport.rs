//! The shared session that performs network I/O.
//!
//! # Design
//! `Transport` is the seam between `RestClient` and the network. The client
//! holds one `Arc<dyn Transport>` for its whole lifetime and never creates
//! or tears down connections itself; pooling and threading belong to the
//! implementation. `ReqwestTransport` wraps a single `reqwest::Client`.

use std::collections::hash_map::Entry;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Method};
use tracing::trace;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};

/// Executes one request and returns the response, or an error when no
/// response was received.
///
/// An error status is still a response and must come back as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// A [`Transport`] backed by one pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::limited(config.max_redirects));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let headers = header_map(&request.headers)?;
        let mut builder = self
            .client
            .request(method(request.method), request.url.as_str())
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = self.client.execute(builder.build()?).await?;

        trace!("got {} response from {}", response.status(), &request.url);

        let status = response.status().as_u16();
        let headers = normalize_headers(response.headers());
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
    }
}

/// Convert caller headers into a `HeaderMap`.
///
/// Names are compared case-insensitively. Two keys that differ only in
/// case are rejected as `InvalidHeader` rather than letting map iteration
/// order pick a winner.
fn header_map(headers: &Headers) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = |reason: String| TransportError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        if map.contains_key(&name) {
            return Err(invalid("duplicate header name".to_string()));
        }
        map.insert(name, value);
    }
    Ok(map)
}

/// Flatten a `HeaderMap` into plain strings.
///
/// Names come out lowercase. Repeated names are joined with `", "`, and
/// values that are not UTF-8 are decoded lossily.
fn normalize_headers(headers: &HeaderMap) -> Headers {
    let mut normalized = Headers::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match normalized.entry(name.as_str().to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value.into_owned());
            }
        }
    }
    normalized
}
