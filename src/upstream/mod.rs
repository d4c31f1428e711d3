pub mod http;
pub mod trait_def;

pub use http::HttpUpstream;
pub use trait_def::{OutboundResult, Upstream, UpstreamError, UpstreamResult};
