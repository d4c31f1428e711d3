//! HttpUpstream tests against a local axum server
//!
//! Verifies that statuses are passed through rather than turned into
//! errors, that only the supplied headers are sent, and that transport
//! failures surface as `UpstreamError::Transport`.

use axum::{
    extract::RawQuery,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use url::Url;

use analytics_proxy::upstream::{HttpUpstream, Upstream, UpstreamError};

async fn echo(headers: HeaderMap, RawQuery(query): RawQuery) -> impl IntoResponse {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("<none>")
        .to_string();
    let language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("<none>")
        .to_string();

    (
        [(header::CONTENT_TYPE, "text/plain")],
        format!("ua={user_agent};lang={language};query={}", query.unwrap_or_default()),
    )
}

async fn teapot() -> impl IntoResponse {
    (StatusCode::IM_A_TEAPOT, "short and stout")
}

async fn untyped() -> impl IntoResponse {
    axum::body::Body::from("raw")
}

/// Start a local server and return its address
async fn start_server() -> SocketAddr {
    let app = Router::new()
        .route("/echo", get(echo))
        .route("/teapot", get(teapot))
        .route("/untyped", get(untyped));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn url(addr: SocketAddr, path: &str) -> Url {
    Url::parse(&format!("http://{addr}{path}")).unwrap()
}

#[tokio::test]
async fn test_sends_only_supplied_headers() {
    let addr = start_server().await;
    let upstream = HttpUpstream::new().unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("de-DE"));

    let result = upstream
        .get(&url(addr, "/echo?v=1&uip=9.9.9.9"), headers)
        .await
        .unwrap();

    assert_eq!(result.status, StatusCode::OK);
    assert_eq!(result.content_type.as_deref(), Some("text/plain"));
    assert_eq!(
        &result.body[..],
        b"ua=<none>;lang=de-DE;query=v=1&uip=9.9.9.9"
    );
}

#[tokio::test]
async fn test_forwards_user_agent() {
    let addr = start_server().await;
    let upstream = HttpUpstream::new().unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

    let result = upstream.get(&url(addr, "/echo"), headers).await.unwrap();

    assert_eq!(&result.body[..], b"ua=Mozilla/5.0;lang=<none>;query=");
}

#[tokio::test]
async fn test_non_success_status_is_not_an_error() {
    let addr = start_server().await;
    let upstream = HttpUpstream::new().unwrap();

    let result = upstream
        .get(&url(addr, "/teapot"), HeaderMap::new())
        .await
        .unwrap();

    assert_eq!(result.status, StatusCode::IM_A_TEAPOT);
    assert_eq!(&result.body[..], b"short and stout");

    let missing = upstream
        .get(&url(addr, "/missing"), HeaderMap::new())
        .await
        .unwrap();
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_content_type_is_none() {
    let addr = start_server().await;
    let upstream = HttpUpstream::new().unwrap();

    let result = upstream
        .get(&url(addr, "/untyped"), HeaderMap::new())
        .await
        .unwrap();

    assert_eq!(result.status, StatusCode::OK);
    assert_eq!(result.content_type, None);
    assert_eq!(&result.body[..], b"raw");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let upstream = HttpUpstream::new().unwrap();
    let result = upstream.get(&url(addr, "/echo"), HeaderMap::new()).await;

    assert!(matches!(result, Err(UpstreamError::Transport(_))));
}
