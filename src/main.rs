use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use analytics_proxy::analytics::AnalyticsProxy;
use analytics_proxy::config::Config;
use analytics_proxy::proxy::create_proxy_router;
use analytics_proxy::upstream::{HttpUpstream, Upstream};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analytics_proxy=info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    let proxy_config = Arc::new(config.proxy.clone());
    if proxy_config.rewrites_hosts() {
        info!(
            "🔁 Rewriting {} to {} in the analytics script",
            proxy_config.replace_match, proxy_config.replace_value
        );
    } else {
        info!("🔁 PROXY_HOST not set - the analytics script is served unmodified");
    }
    match proxy_config.placeholder() {
        Some(ip) => info!("🕶️  Private caller addresses are forwarded as {}", ip),
        None => info!("🕶️  PROXY_DEFAULT_IP not set - private caller addresses pass through"),
    }

    let upstream: Arc<dyn Upstream> = Arc::new(HttpUpstream::new()?);
    let analytics = Arc::new(AnalyticsProxy::new(proxy_config, upstream));
    let router = create_proxy_router(analytics);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Analytics proxy listening on http://{}", addr);
    info!("   - Script available at http://{}/analytics.js", addr);
    info!("   - Hits accepted at http://{}/collect", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
