use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const FORM_BOUNDARY: &str = "mock-boundary";
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";
pub const OCTET_BYTES: &[u8] = &[0xde, 0xad, 0xbe, 0xef];
pub const RAW_BYTES: &[u8] = &[0x00, 0x01, 0x02, 0x03];
pub const TEXT_BODY: &str = "hello from mock";
pub const SLOW_DELAY: Duration = Duration::from_secs(10);

/// What the server saw, returned by `/echo` and `/items`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct AppState {
    hits: Arc<AtomicU64>,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/items", get(echo))
        .route("/text", get(text))
        .route("/image", get(image))
        .route("/octet", get(octet))
        .route("/form", get(form))
        .route("/raw", get(raw))
        .route("/custom", get(custom))
        .route("/malformed", get(malformed))
        .route("/status/{code}", any(status))
        .route("/slow", any(slow))
        .route("/hits", any(hits))
        .with_state(AppState::default())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// The `multipart/form-data` body served by `/form`: one text field and one
/// file field.
pub fn form_body() -> String {
    format!(
        "--{b}\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\
\r\n\
mock form\r\n\
--{b}\r\n\
Content-Disposition: form-data; name=\"upload\"; filename=\"notes.txt\"\r\n\
Content-Type: text/plain\r\n\
\r\n\
line one\r\n\
--{b}--\r\n",
        b = FORM_BOUNDARY
    )
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(Echo {
        method: method.to_string(),
        uri: uri.to_string(),
        headers,
        body,
    })
}

async fn text() -> &'static str {
    TEXT_BODY
}

async fn image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], IMAGE_BYTES)
}

async fn octet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], OCTET_BYTES)
}

async fn form() -> impl IntoResponse {
    let content_type = format!("multipart/form-data; boundary={FORM_BOUNDARY}");
    ([(header::CONTENT_TYPE, content_type)], form_body())
}

/// No content-type header at all.
async fn raw() -> Response {
    Response::new(Body::from(RAW_BYTES))
}

async fn custom() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/xml")], "<item/>")
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "not json")
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, format!("status {code}"))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({ "slow": true }))
}

async fn hits(State(state): State<AppState>) -> Json<Value> {
    let hits = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    tracing::debug!(hits, "hit counter incremented");
    Json(json!({ "hits": hits }))
}
