//! Callback-style dispatcher for GET/PUT/POST/DELETE/HEAD requests.
//!
//! # Design
//! `RestClient` holds no mutable state. It owns a handle to the shared
//! transport session and a runtime handle to spawn onto. Every verb builds
//! an `HttpRequest` and spawns one task, and that task invokes the
//! completion callback exactly once. Callbacks run on a runtime worker, and
//! concurrent calls may complete in any order. No call can be cancelled or
//! retried.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, error, warn};

use crate::completion::Completion;
use crate::error::RequestError;
use crate::http::{Headers, HttpMethod, HttpRequest};
use crate::resource::Resource;
use crate::transport::Transport;

/// `tracing` target for every event the dispatcher emits.
pub const LOG_TARGET: &str = "rest_core::network";

/// Issues requests through a shared [`Transport`] and reports each outcome
/// to a completion callback.
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn Transport>,
    runtime: Handle,
}

impl RestClient {
    pub fn new(transport: Arc<dyn Transport>, runtime: Handle) -> Self {
        Self { transport, runtime }
    }

    /// Like [`RestClient::new`], spawning onto the runtime this is called
    /// from. Panics outside a tokio runtime.
    pub fn with_current_runtime(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, Handle::current())
    }

    pub fn get<F>(&self, resource: &Resource, headers: Option<Headers>, completion: F)
    where
        F: FnOnce(Completion) + Send + 'static,
    {
        self.dispatch(resource, HttpMethod::Get, headers, None, completion);
    }

    pub fn put<F>(
        &self,
        resource: &Resource,
        headers: Option<Headers>,
        body: Option<Vec<u8>>,
        completion: F,
    ) where
        F: FnOnce(Completion) + Send + 'static,
    {
        self.dispatch(resource, HttpMethod::Put, headers, body, completion);
    }

    pub fn post<F>(
        &self,
        resource: &Resource,
        headers: Option<Headers>,
        body: Option<Vec<u8>>,
        completion: F,
    ) where
        F: FnOnce(Completion) + Send + 'static,
    {
        self.dispatch(resource, HttpMethod::Post, headers, body, completion);
    }

    pub fn delete<F>(&self, resource: &Resource, headers: Option<Headers>, completion: F)
    where
        F: FnOnce(Completion) + Send + 'static,
    {
        self.dispatch(resource, HttpMethod::Delete, headers, None, completion);
    }

    pub fn head<F>(&self, resource: &Resource, headers: Option<Headers>, completion: F)
    where
        F: FnOnce(Completion) + Send + 'static,
    {
        self.dispatch(resource, HttpMethod::Head, headers, None, completion);
    }

    /// Send one request and wait for its outcome.
    ///
    /// This is what every verb runs inside its spawned task. It never fails:
    /// transport errors come back as a `ConnectionFailure` completion.
    pub async fn send_request(
        &self,
        resource: &Resource,
        method: HttpMethod,
        headers: Option<Headers>,
        body: Option<Vec<u8>>,
    ) -> Completion {
        execute(self.transport.as_ref(), build_request(resource, method, headers, body)).await
    }

    fn dispatch<F>(
        &self,
        resource: &Resource,
        method: HttpMethod,
        headers: Option<Headers>,
        body: Option<Vec<u8>>,
        completion: F,
    ) where
        F: FnOnce(Completion) + Send + 'static,
    {
        let request = build_request(resource, method, headers, body);
        let transport = self.transport.clone();
        self.runtime.spawn(async move {
            completion(execute(transport.as_ref(), request).await);
        });
    }
}

/// Resolve a resource, method, headers and body into an `HttpRequest`.
pub fn build_request(
    resource: &Resource,
    method: HttpMethod,
    headers: Option<Headers>,
    body: Option<Vec<u8>>,
) -> HttpRequest {
    HttpRequest {
        method,
        url: resource.url(),
        headers: headers.unwrap_or_default(),
        body,
    }
}

async fn execute(transport: &dyn Transport, request: HttpRequest) -> Completion {
    debug!(target: LOG_TARGET, "{} {}", request.method, request.url);

    let method = request.method;
    let url = request.url.clone();
    match transport.send(request).await {
        Ok(response) => {
            let completion = Completion::from_response(response);
            if let Some(error) = completion.error {
                error!(
                    target: LOG_TARGET,
                    status = completion.status,
                    "{method} {url} failed: {error}"
                );
            }
            completion
        }
        Err(cause) => {
            warn!(target: LOG_TARGET, "{method} {url}: {cause}");
            error!(
                target: LOG_TARGET,
                "{method} {url} failed: {}",
                RequestError::ConnectionFailure
            );
            Completion::connection_failure()
        }
    }
}
