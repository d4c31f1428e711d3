use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid upstream url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// What came back from a single upstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResult {
    pub status: StatusCode,
    /// The upstream `content-type`, if it sent one
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue exactly one GET to `url` with `headers` added to the request.
    ///
    /// Any status the upstream answers with is a successful result; only
    /// transport-level problems are errors.
    async fn get(&self, url: &Url, headers: HeaderMap) -> UpstreamResult<OutboundResult>;
}
