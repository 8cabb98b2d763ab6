use anyhow::Context;
use ferrous_doh_domain::{CliOverrides, Config};
use tracing::{info, warn};

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Logs the resolved configuration once logging is up.
pub fn log_config(config: &Config) {
    info!(
        bind_address = %config.server.bind_address,
        dns_port = config.server.dns_port,
        dot_port = config.server.dot_port,
        "Listener configuration"
    );
    info!(
        servers = ?config.upstream.servers,
        fallback = %config.upstream.fallback,
        retry_attempts = config.upstream.retry_attempts,
        timeout_ms = config.upstream.timeout_ms,
        "Upstream configuration"
    );
    info!(
        domain = %config.tls.domain,
        cert_dir = %config.tls.cert_dir,
        preferred_chain = %config.tls.preferred_chain,
        email = %config.tls.email,
        dns_provider = %config.tls.dns_provider,
        renew_threshold_days = config.tls.renew_threshold_days,
        "Certificate configuration"
    );

    if config.upstream.retry_attempts == 0 {
        warn!("retry_attempts is 0, the primary upstreams are still tried once");
    }
}
