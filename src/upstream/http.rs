use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::trait_def::{OutboundResult, Upstream, UpstreamResult};

/// Applied to the whole exchange; the upstream call is the only thing a request waits on.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// `Upstream` backed by a shared reqwest client
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new() -> anyhow::Result<Self> {
        // No default user-agent: a caller without one is forwarded without one.
        let client = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .context("failed to build HTTP client for the analytics upstream")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get(&self, url: &Url, headers: HeaderMap) -> UpstreamResult<OutboundResult> {
        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "upstream request failed"))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "failed to read upstream body"))?;

        debug!(url = %url, status = %status, bytes = body.len(), "upstream responded");

        Ok(OutboundResult {
            status,
            content_type,
            body,
        })
    }
}
