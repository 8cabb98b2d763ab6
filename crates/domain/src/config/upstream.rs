use serde::{Deserialize, Serialize};

/// Literal token in an upstream URL that is replaced by the client identifier.
pub const CLIENT_ID_PLACEHOLDER: &str = "_CLIENTID_";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// DoH resolvers used in round-robin order. May contain `_CLIENTID_`.
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    /// Attempts against `servers` before the fallback resolver is used
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Resolver used once all primary attempts failed
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Timeout of a single upstream request
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            retry_attempts: default_retry_attempts(),
            fallback: default_fallback(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_servers() -> Vec<String> {
    vec![default_fallback()]
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_fallback() -> String {
    "https://cloudflare-dns.com/dns-query".to_string()
}

fn default_timeout_ms() -> u64 {
    1000
}

/// Parses an upstream URL template, requiring a scheme and a host.
///
/// Surrounding whitespace is ignored. The placeholder is kept as-is so it
/// can be substituted per request.
pub fn parse_upstream_url(raw: &str) -> Result<url::Url, crate::DomainError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| crate::DomainError::InvalidUpstreamUrl {
        url: trimmed.to_string(),
        reason: reason.to_string(),
    };

    let url = url::Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme().is_empty() {
        return Err(invalid("missing scheme"));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid("missing host")),
    }
}
