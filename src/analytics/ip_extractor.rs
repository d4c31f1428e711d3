//! Caller IP resolution for forwarded hits
//!
//! The `x-forwarded-for` header wins over the socket remote address. The
//! resolved value is kept as text: it is forwarded verbatim unless the
//! classifier decides to replace it, so proxy chains, malformed or IPv6
//! values survive unchanged.

use axum::http::HeaderMap;
use std::net::IpAddr;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolve the caller IP from headers, falling back to the socket address.
///
/// Returns `None` when neither source yields a value.
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: Option<IpAddr>) -> Option<String> {
    extract_from_x_forwarded_for(headers).or_else(|| socket_addr.map(|ip| ip.to_string()))
}

/// The whole `X-Forwarded-For` value; opaque bytes are decoded lossily
fn extract_from_x_forwarded_for(headers: &HeaderMap) -> Option<String> {
    let xff = headers.get(X_FORWARDED_FOR)?;
    let value = String::from_utf8_lossy(xff.as_bytes());

    if value.trim().is_empty() {
        None
    } else {
        Some(value.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn socket() -> Option<IpAddr> {
        Some("192.168.1.1".parse().unwrap())
    }

    #[test]
    fn test_socket_address_without_header() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_client_ip(&headers, socket()),
            Some("192.168.1.1".to_string())
        );
    }

    #[test]
    fn test_header_wins_over_socket() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("10.1.2.3"));

        assert_eq!(
            extract_client_ip(&headers, socket()),
            Some("10.1.2.3".to_string())
        );
    }

    #[test]
    fn test_chained_header_is_kept_whole() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("10.0.0.5, 172.16.0.1"),
        );

        assert_eq!(
            extract_client_ip(&headers, socket()),
            Some("10.0.0.5, 172.16.0.1".to_string())
        );
    }

    #[test]
    fn test_opaque_header_bytes_still_win_over_socket() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_bytes(b"10.0.0.\xff").unwrap(),
        );

        assert_eq!(
            extract_client_ip(&headers, socket()),
            Some("10.0.0.\u{FFFD}".to_string())
        );
    }

    #[test]
    fn test_unparsable_header_value_is_kept_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("unknown"));

        assert_eq!(
            extract_client_ip(&headers, socket()),
            Some("unknown".to_string())
        );
    }

    #[test]
    fn test_empty_header_falls_back_to_socket() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(""));

        assert_eq!(
            extract_client_ip(&headers, socket()),
            Some("192.168.1.1".to_string())
        );
    }

    #[test]
    fn test_no_source_yields_none() {
        assert_eq!(extract_client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_ipv6_socket_address() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(
            extract_client_ip(&HeaderMap::new(), Some(ip)),
            Some("2001:db8::1".to_string())
        );
    }
}
