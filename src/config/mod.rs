use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Hostname the upstream script embeds for its own endpoints
pub const REPLACE_MATCH: &str = "www.google-analytics.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Literal hostname searched for in the fetched script
    pub replace_match: String,
    /// Hostname written in its place; equals `replace_match` when unconfigured
    pub replace_value: String,
    /// Address forwarded instead of a private/reserved caller address
    #[serde(default)]
    pub public_ip_address: Option<String>,
}

impl ServerConfig {
    const fn default_port() -> u16 {
        8080
    }

    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
}

impl ProxyConfig {
    pub fn new(replace_value: Option<String>, public_ip_address: Option<String>) -> Self {
        let replace_value = replace_value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| REPLACE_MATCH.to_string());

        Self {
            replace_match: REPLACE_MATCH.to_string(),
            replace_value,
            public_ip_address: public_ip_address.filter(|v| !v.is_empty()),
        }
    }

    /// The placeholder address, if one is configured and non-empty
    pub fn placeholder(&self) -> Option<&str> {
        self.public_ip_address.as_deref().filter(|v| !v.is_empty())
    }

    pub fn rewrites_hosts(&self) -> bool {
        self.replace_value != self.replace_match
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Empty values and the literal `null` count as unset.
fn normalize(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "null" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).and_then(normalize);

        let port = match var("PROXY_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PROXY_PORT must be a valid port number, got '{raw}'"))?,
            None => ServerConfig::default_port(),
        };
        let host = var("PROXY_BIND_HOST").unwrap_or_else(ServerConfig::default_host);

        let proxy = ProxyConfig::new(var("PROXY_HOST"), var("PROXY_DEFAULT_IP"));

        if let Some(ip) = proxy.placeholder() {
            if ip.parse::<std::net::IpAddr>().is_err() {
                tracing::warn!(
                    "PROXY_DEFAULT_IP '{ip}' is not an IP address; it will still be forwarded as-is"
                );
            }
        }

        Ok(Config {
            server: ServerConfig { host, port },
            proxy,
        })
    }
}
