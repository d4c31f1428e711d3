use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::debug;

pub async fn log_request(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed = ?started.elapsed(),
        "request handled"
    );
    response
}
