use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::tls::TlsConfig;
use super::upstream::{parse_upstream_url, UpstreamConfig};

/// Main configuration structure for Ferrous DoH
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (bind address, ports, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream DoH resolvers, retry and fallback policy
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Service domain and certificate management
    #[serde(default)]
    pub tls: TlsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-doh.toml in current directory
    /// 3. /etc/ferrous-doh/config.toml
    /// 4. Default configuration
    ///
    /// Command-line overrides are applied on top of whichever source was used.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-doh.toml").exists() {
            Self::from_file("ferrous-doh.toml")?
        } else if std::path::Path::new("/etc/ferrous-doh/config.toml").exists() {
            Self::from_file("/etc/ferrous-doh/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(port) = overrides.dot_port {
            self.server.dot_port = port;
        }
        if let Some(domain) = overrides.tls_domain {
            self.tls.domain = domain;
        }
        if let Some(servers) = overrides.upstream_servers {
            self.upstream.servers = servers;
        }
        if let Some(attempts) = overrides.retry_attempts {
            self.upstream.retry_attempts = attempts;
        }
        if let Some(fallback) = overrides.fallback {
            self.upstream.fallback = fallback;
        }
        if let Some(timeout) = overrides.upstream_timeout_ms {
            self.upstream.timeout_ms = timeout;
        }
        if let Some(dir) = overrides.cert_dir {
            self.tls.cert_dir = dir;
        }
        if let Some(chain) = overrides.preferred_chain {
            self.tls.preferred_chain = chain;
        }
        if let Some(email) = overrides.email {
            self.tls.email = email;
        }
        if let Some(provider) = overrides.dns_provider {
            self.tls.dns_provider = provider;
        }
        if let Some(days) = overrides.renew_threshold_days {
            self.tls.renew_threshold_days = days;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tls.domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "TLS domain must be configured".to_string(),
            ));
        }

        if self
            .server
            .bind_address
            .parse::<std::net::IpAddr>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "Invalid bind address '{}'",
                self.server.bind_address
            )));
        }

        if self.server.dns_port == 0 || self.server.dot_port == 0 {
            return Err(ConfigError::Validation(
                "Listener ports cannot be 0".to_string(),
            ));
        }

        if self.upstream.servers.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream DoH servers configured".to_string(),
            ));
        }

        for server in self
            .upstream
            .servers
            .iter()
            .chain(std::iter::once(&self.upstream.fallback))
        {
            parse_upstream_url(server).map_err(|e| ConfigError::Validation(e.to_string()))?;
        }

        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Upstream timeout cannot be 0".to_string(),
            ));
        }

        if self.tls.refresh_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "Certificate refresh interval cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream.timeout_ms)
    }

    /// Primary attempts actually made; at least one.
    pub fn effective_retry_attempts(&self) -> u32 {
        self.upstream.retry_attempts.max(1)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub dns_port: Option<u16>,
    pub dot_port: Option<u16>,
    pub tls_domain: Option<String>,
    pub upstream_servers: Option<Vec<String>>,
    pub retry_attempts: Option<u32>,
    pub fallback: Option<String>,
    pub upstream_timeout_ms: Option<u64>,
    pub cert_dir: Option<String>,
    pub preferred_chain: Option<String>,
    pub email: Option<String>,
    pub dns_provider: Option<String>,
    pub renew_threshold_days: Option<u32>,
    pub log_level: Option<String>,
}
