//! Callback-style HTTP convenience client.
//!
//! # Overview
//! Exposes GET/PUT/POST/DELETE/HEAD helpers that take a `Resource`
//! (scheme, host, path), optional headers and an optional body, and report
//! `(error, status, headers, body)` to a completion callback exactly once.
//!
//! # Design
//! - `RestClient` is stateless apart from a shared `Transport` session and
//!   the runtime handle it spawns onto.
//! - Status codes map to four error kinds (`RequestError`). Transport
//!   failures surface as `ConnectionFailure` with no status, headers or body.
//! - `ReqwestTransport` is the production session; tests inject their own
//!   `Transport`.
//! - Logging goes through `tracing` under the `rest_core::network` target.

pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod http;
pub mod resource;
pub mod transport;

pub use client::RestClient;
pub use completion::Completion;
pub use config::TransportConfig;
pub use error::{RequestError, TransportError};
pub use http::{Headers, HttpMethod, HttpMethodError, HttpRequest, HttpResponse};
pub use resource::Resource;
pub use transport::{ReqwestTransport, Transport};
