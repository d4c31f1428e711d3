use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::analytics::AnalyticsProxy;

use super::handlers::{analytics_script, collect, health_check, ProxyState};
use super::middleware::log_request;

pub fn create_proxy_router(analytics: Arc<AnalyticsProxy>) -> Router {
    let state = Arc::new(ProxyState { analytics });

    Router::new()
        .route("/analytics.js", get(analytics_script))
        .route("/collect", get(collect))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
