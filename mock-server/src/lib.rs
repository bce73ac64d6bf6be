use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::RwLock};

pub type Db = Arc<RwLock<HashMap<String, Bytes>>>;

/// What `/echo` reports back about the request it received.
#[derive(Debug, Serialize)]
pub struct Echo {
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/users/{id}", get(get_user).put(put_user).delete(delete_user))
        .route("/items", post(create_item))
        .route("/status/{code}", get(status))
        .route("/headers", get(fixed_headers))
        .route("/private", get(private))
        .route("/echo", any(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Bytes, (StatusCode, &'static str)> {
    let users = db.read().await;
    users
        .get(&id)
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, "not found"))
}

async fn put_user(State(db): State<Db>, Path(id): Path<String>, body: Bytes) -> StatusCode {
    let created = db.write().await.insert(id, body).is_none();
    if created {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn delete_user(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    let mut users = db.write().await;
    users
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or((StatusCode::NOT_FOUND, "not found"))
}

async fn create_item(_body: Bytes) -> StatusCode {
    StatusCode::CREATED
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    match StatusCode::from_u16(code) {
        Ok(status) if code >= 200 => (status, format!("status {code}")),
        _ => (StatusCode::BAD_REQUEST, format!("invalid status {code}")),
    }
}

async fn fixed_headers() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/plain"),
            (header::HeaderName::from_static("x-custom"), "42"),
        ],
        "ok",
    )
}

async fn private(headers: HeaderMap) -> impl IntoResponse {
    if headers.contains_key(header::AUTHORIZATION) {
        (StatusCode::OK, "welcome")
    } else {
        (StatusCode::UNAUTHORIZED, "unauthorized")
    }
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
