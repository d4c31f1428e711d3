use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::net::IpAddr;

/// The parts of an inbound `/collect` request the transform reads
#[derive(Debug, Clone)]
pub struct IncomingHitRequest {
    /// Original request target including the query string
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Socket-level peer address, when the transport exposes it
    pub remote_addr: Option<IpAddr>,
}

impl IncomingHitRequest {
    pub fn new(uri: Uri, headers: HeaderMap, remote_addr: Option<IpAddr>) -> Self {
        Self {
            uri,
            headers,
            remote_addr,
        }
    }

    pub fn query(&self) -> &str {
        self.uri.query().unwrap_or("")
    }
}

/// Status, content type and body to be written back unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub content_type: String,
    /// `None` means the upstream produced nothing to relay
    pub body: Option<Bytes>,
}

impl ProxyResponse {
    pub fn new(status: StatusCode, content_type: impl Into<String>, body: Option<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body,
        }
    }

    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

        (
            self.status,
            [(header::CONTENT_TYPE, content_type)],
            Body::from(self.body.unwrap_or_default()),
        )
            .into_response()
    }
}
