use axum::{
    extract::{ConnectInfo, Request, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::{AnalyticsProxy, IncomingHitRequest};

pub struct ProxyState {
    pub analytics: Arc<AnalyticsProxy>,
}

/// Serve the rewritten tracking script
pub async fn analytics_script(State(state): State<Arc<ProxyState>>) -> impl IntoResponse {
    state.analytics.fetch_script().await
}

/// Relay a tracking hit to the collector
pub async fn collect(State(state): State<Arc<ProxyState>>, request: Request) -> impl IntoResponse {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let (parts, _body) = request.into_parts();
    let incoming = IncomingHitRequest::new(parts.uri, parts.headers, remote_addr);

    state.analytics.forward_hit(&incoming).await
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
