//! Analytics request transformation
//!
//! Rewrites the upstream tracking script so the browser talks to this host,
//! and relays hits to the collector with private caller addresses masked.

pub mod ip_classifier;
pub mod ip_extractor;
pub mod models;
pub mod rewrite;
pub mod transform;

pub use ip_classifier::classify;
pub use ip_extractor::extract_client_ip;
pub use models::{IncomingHitRequest, ProxyResponse};
pub use transform::AnalyticsProxy;
