//! Script rewriting and hit forwarding against the analytics upstream
//!
//! Both operations make a single upstream call and never fail outward:
//! transport errors become a fixed response (404 for the script, 500 for a
//! hit) so the serving layer can always write the result back as-is.

use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use bytes::Bytes;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

use super::ip_classifier::classify;
use super::ip_extractor::extract_client_ip;
use super::models::{IncomingHitRequest, ProxyResponse};
use super::rewrite::rewrite_hosts;
use crate::config::ProxyConfig;
use crate::upstream::{Upstream, UpstreamError};

pub const ANALYTICS_SCRIPT_URL: &str = "https://www.google-analytics.com/analytics.js";
pub const ANALYTICS_HIT_URL: &str = "https://www.google-analytics.com/collect";

/// Query key carrying the caller IP on a hit
pub const UIP_PARAM: &str = "uip";

const SCRIPT_CONTENT_TYPE: &str = "text/javascript";
const FALLBACK_CONTENT_TYPE: &str = "text/plain";

/// Client headers relayed to the collector
const FORWARDED_HEADERS: [HeaderName; 2] = [header::USER_AGENT, header::ACCEPT_LANGUAGE];

pub struct AnalyticsProxy {
    config: Arc<ProxyConfig>,
    upstream: Arc<dyn Upstream>,
}

impl AnalyticsProxy {
    pub fn new(config: Arc<ProxyConfig>, upstream: Arc<dyn Upstream>) -> Self {
        Self { config, upstream }
    }

    /// Download the tracking script and point its hostnames back at the proxy.
    pub async fn fetch_script(&self) -> ProxyResponse {
        let result = match Url::parse(ANALYTICS_SCRIPT_URL) {
            Ok(url) => self.upstream.get(&url, HeaderMap::new()).await,
            Err(e) => Err(UpstreamError::from(e)),
        };

        let outbound = match result {
            Ok(outbound) => outbound,
            Err(e) => {
                warn!(error = %e, "analytics script unavailable");
                return ProxyResponse::new(
                    StatusCode::NOT_FOUND,
                    FALLBACK_CONTENT_TYPE,
                    Some(Bytes::new()),
                );
            }
        };

        let content_type = outbound
            .content_type
            .unwrap_or_else(|| SCRIPT_CONTENT_TYPE.to_string());

        let source = String::from_utf8_lossy(&outbound.body);
        let body = match rewrite_hosts(
            &source,
            &self.config.replace_match,
            &self.config.replace_value,
        ) {
            // Nothing replaced: relay the upstream bytes exactly as received.
            Cow::Borrowed(_) => outbound.body.clone(),
            Cow::Owned(rewritten) => Bytes::from(rewritten),
        };

        ProxyResponse::new(outbound.status, content_type, Some(body))
    }

    /// Relay a tracking hit to the collector with the caller IP resolved.
    pub async fn forward_hit(&self, incoming: &IncomingHitRequest) -> ProxyResponse {
        let url = match self.collect_url(incoming) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "failed to build collect url");
                return Self::hit_failure();
            }
        };

        match self.upstream.get(&url, outbound_headers(&incoming.headers)).await {
            Ok(outbound) => ProxyResponse::new(
                outbound.status,
                outbound
                    .content_type
                    .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
                Some(outbound.body).filter(|b| !b.is_empty()),
            ),
            Err(e) => {
                warn!(error = %e, "failed to forward hit");
                Self::hit_failure()
            }
        }
    }

    /// Collector URL carrying the inbound query, with `uip` resolved
    fn collect_url(&self, incoming: &IncomingHitRequest) -> Result<Url, UpstreamError> {
        let mut pairs: Vec<(String, String)> =
            form_urlencoded::parse(incoming.query().as_bytes())
                .into_owned()
                .collect();

        if let Some(ip) = extract_client_ip(&incoming.headers, incoming.remote_addr) {
            let uip = classify(&ip, self.config.placeholder());
            debug!(caller_ip = %ip, uip = %uip, "resolved caller address");
            pairs.retain(|(key, _)| key != UIP_PARAM);
            pairs.push((UIP_PARAM.to_string(), uip));
        }

        let mut url = Url::parse(ANALYTICS_HIT_URL)?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    fn hit_failure() -> ProxyResponse {
        ProxyResponse::new(StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_CONTENT_TYPE, None)
    }
}

/// Copy the relayed client headers, skipping any the caller did not send
fn outbound_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in FORWARDED_HEADERS {
        if let Some(value) = incoming.get(&name) {
            headers.insert(name, value.clone());
        }
    }
    headers
}
