//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own thread, then drives
//! `RestClient` with the real `ReqwestTransport` over HTTP. Completions come
//! back through channels, so the tests do not depend on which worker runs
//! a callback.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rest_core::{
    Completion, Headers, HttpMethod, RequestError, Resource, RestClient, ReqwestTransport,
    TransportConfig,
};
use tokio::sync::{mpsc, oneshot};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client() -> RestClient {
    let config = TransportConfig {
        timeout: Some(Duration::from_secs(10)),
        ..TransportConfig::default()
    };
    let transport = ReqwestTransport::new(&config).unwrap();
    RestClient::with_current_runtime(Arc::new(transport))
}

fn resource(addr: SocketAddr, path: &str) -> Resource {
    Resource::new("http", addr.to_string(), path)
}

fn reply(tx: oneshot::Sender<Completion>) -> impl FnOnce(Completion) + Send + 'static {
    move |completion| {
        let _ = tx.send(completion);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn get_missing_user_reports_not_found() {
    let addr = start_server();
    let client = client();

    let (tx, rx) = oneshot::channel();
    client.get(&resource(addr, "/users/1"), None, reply(tx));
    let completion = rx.await.unwrap();

    assert_eq!(completion.error, Some(RequestError::NotFound));
    assert_eq!(completion.status, Some(404));
    assert!(completion.headers.is_some());
    assert_eq!(completion.body_text().as_deref(), Some("not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn post_item_reports_created_with_empty_body() {
    let addr = start_server();
    let client = client();

    let (tx, rx) = oneshot::channel();
    client.post(
        &resource(addr, "/items"),
        None,
        Some(br#"{"a":1}"#.to_vec()),
        reply(tx),
    );
    let completion = rx.await.unwrap();

    assert!(completion.is_success());
    assert_eq!(completion.status, Some(201));
    assert!(completion.headers.is_some());
    assert_eq!(completion.body.as_deref(), Some(&b""[..]));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_host_reports_connection_failure() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client();

    let (tx, rx) = oneshot::channel();
    client.get(&resource(addr, "/"), None, reply(tx));
    let completion = rx.await.unwrap();

    assert_eq!(completion, Completion::connection_failure());
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_url_reports_connection_failure() {
    let client = client();

    let (tx, rx) = oneshot::channel();
    client.get(&Resource::new("http", "bad host", "/"), None, reply(tx));
    let completion = rx.await.unwrap();

    assert_eq!(completion, Completion::connection_failure());
}

#[tokio::test(flavor = "multi_thread")]
async fn response_headers_are_normalized() {
    let addr = start_server();
    let client = client();

    let completion = client
        .send_request(&resource(addr, "/headers"), HttpMethod::Get, None, None)
        .await;

    let headers = completion.headers.unwrap();
    assert_eq!(headers.get("content-type").map(String::as_str), Some("text/plain"));
    assert_eq!(headers.get("x-custom").map(String::as_str), Some("42"));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_codes_are_classified() {
    let addr = start_server();
    let client = client();

    let cases = [
        (200, None),
        (204, None),
        (304, None),
        (400, Some(RequestError::ServerError)),
        (401, Some(RequestError::Unauthorized)),
        (404, Some(RequestError::NotFound)),
        (418, Some(RequestError::ServerError)),
        (500, Some(RequestError::ServerError)),
        (599, Some(RequestError::ServerError)),
    ];
    for (status, expected) in cases {
        let completion = client
            .send_request(&resource(addr, &format!("/status/{status}")), HttpMethod::Get, None, None)
            .await;
        assert_eq!(completion.status, Some(status), "status {status}");
        assert_eq!(completion.error, expected, "status {status}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn request_headers_and_body_reach_the_server() {
    let addr = start_server();
    let client = client();
    let headers: Headers = [("x-trace".to_string(), "abc".to_string())]
        .into_iter()
        .collect();

    let (tx, rx) = oneshot::channel();
    client.put(
        &resource(addr, "/echo"),
        Some(headers),
        Some(b"payload".to_vec()),
        reply(tx),
    );
    let completion = rx.await.unwrap();

    assert!(completion.is_success());
    let echo: serde_json::Value = serde_json::from_slice(completion.body.as_deref().unwrap()).unwrap();
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["headers"]["x-trace"], "abc");
    assert_eq!(echo["body"], "payload");
}

#[tokio::test(flavor = "multi_thread")]
async fn authorization_header_unlocks_private_route() {
    let addr = start_server();
    let client = client();
    let private = resource(addr, "/private");

    let denied = client.send_request(&private, HttpMethod::Get, None, None).await;
    assert_eq!(denied.error, Some(RequestError::Unauthorized));
    assert_eq!(denied.status, Some(401));

    let headers: Headers = [("Authorization".to_string(), "Bearer token".to_string())]
        .into_iter()
        .collect();
    let allowed = client
        .send_request(&private, HttpMethod::Get, Some(headers), None)
        .await;
    assert!(allowed.is_success());
    assert_eq!(allowed.body_text().as_deref(), Some("welcome"));
}

#[tokio::test(flavor = "multi_thread")]
async fn user_lifecycle_over_every_verb() {
    let addr = start_server();
    let client = client();
    let user = resource(addr, "/users/7");

    let created = client
        .send_request(&user, HttpMethod::Put, None, Some(b"alice".to_vec()))
        .await;
    assert_eq!(created.status, Some(201));

    let fetched = client.send_request(&user, HttpMethod::Get, None, None).await;
    assert_eq!(fetched.body_text().as_deref(), Some("alice"));

    let head = client.send_request(&user, HttpMethod::Head, None, None).await;
    assert!(head.is_success());
    assert_eq!(head.status, Some(200));
    assert_eq!(head.body.as_deref(), Some(&b""[..]));

    let deleted = client.send_request(&user, HttpMethod::Delete, None, None).await;
    assert_eq!(deleted.status, Some(204));

    let gone = client.send_request(&user, HttpMethod::Get, None, None).await;
    assert_eq!(gone.error, Some(RequestError::NotFound));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_calls_each_complete_once() {
    let addr = start_server();
    let client = client();
    let (tx, mut rx) = mpsc::unbounded_channel();

    for i in 0..16u16 {
        let tx = tx.clone();
        let path = if i % 2 == 0 { "/status/200" } else { "/status/500" };
        client.get(&resource(addr, path), None, move |completion| {
            let _ = tx.send((i, completion));
        });
    }
    drop(tx);

    let mut seen = Vec::new();
    while let Some((i, completion)) = rx.recv().await {
        let expected = if i % 2 == 0 { 200 } else { 500 };
        assert_eq!(completion.status, Some(expected));
        seen.push(i);
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..16).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread")]
async fn prebuilt_reqwest_client_is_used_as_transport() {
    let addr = start_server();
    let transport = ReqwestTransport::from_client(reqwest::Client::new());
    let client = RestClient::with_current_runtime(Arc::new(transport));

    let (tx, rx) = oneshot::channel();
    client.get(&resource(addr, "/headers"), None, reply(tx));
    let completion = rx.await.unwrap();

    assert!(completion.is_success());
    assert_eq!(completion.status, Some(200));
    assert_eq!(completion.header("x-custom"), Some("42"));
    assert_eq!(completion.body_text().as_deref(), Some("ok"));
}
