//! Private/reserved IPv4 detection for caller addresses
//!
//! Addresses are compared as 12-digit decimal numbers made by padding every
//! octet to three digits (`10.0.0.1` becomes `010000000001`), which orders
//! the same way as the addresses themselves. Anything that is not a strict
//! dotted-decimal IPv4 literal, IPv6 included, is never classified and is
//! returned untouched.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Inclusive (low, high) bounds of the ranges that never leave the proxy
pub const PRIVATE_RANGES: [(&str, &str); 5] = [
    ("10.0.0.0", "10.255.255.255"),
    ("172.16.0.0", "172.31.255.255"),
    ("192.168.0.0", "192.168.255.255"),
    ("169.254.0.0", "169.254.255.255"),
    ("127.0.0.0", "127.255.255.255"),
];

static IPV4_PATTERN: OnceLock<Regex> = OnceLock::new();

fn ipv4_pattern() -> &'static Regex {
    IPV4_PATTERN.get_or_init(|| {
        let octet = r"(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";
        Regex::new(&format!(r"^{octet}\.{octet}\.{octet}\.{octet}$"))
            .expect("IPv4 pattern is valid")
    })
}

/// Whether `ip` is a dotted-decimal IPv4 literal with every octet in 0-255
pub fn is_ipv4(ip: &str) -> bool {
    ipv4_pattern().is_match(ip)
}

/// Encode a dotted address as its zero-padded 12-digit number.
///
/// Returns `None` when the padded digits do not form an integer.
pub fn encode_ipv4(ip: &str) -> Option<u64> {
    let padded: String = ip.split('.').map(|octet| format!("{octet:0>3}")).collect();
    padded.parse::<u64>().ok()
}

/// Whether `ip` falls inside any of [`PRIVATE_RANGES`]
pub fn is_private(ip: &str) -> bool {
    if !is_ipv4(ip) {
        return false;
    }
    let Some(value) = encode_ipv4(ip) else {
        return false;
    };

    PRIVATE_RANGES.iter().any(|(low, high)| {
        match (encode_ipv4(low), encode_ipv4(high)) {
            (Some(low), Some(high)) => (low..=high).contains(&value),
            _ => false,
        }
    })
}

/// Resolve the address to forward for a caller.
///
/// Private/reserved IPv4 addresses are swapped for `placeholder` when one is
/// configured and non-empty; every other input comes back unchanged.
pub fn classify(ip: &str, placeholder: Option<&str>) -> String {
    match placeholder.filter(|p| !p.is_empty()) {
        Some(placeholder) if is_private(ip) => {
            debug!(caller_ip = %ip, uip = %placeholder, "replacing private caller address");
            placeholder.to_string()
        }
        _ => ip.to_string(),
    }
}
