use clap::Parser;
use ferrous_doh_domain::CliOverrides;
use ferrous_doh_infrastructure::server::{DnsServer, ListenerConfig};
use ferrous_doh_infrastructure::tls::install_crypto_provider;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "ferrous-doh")]
#[command(version)]
#[command(about = "Ferrous DoH - DNS-over-HTTPS forwarding proxy for UDP, TCP and DoT clients")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Plain DNS port (UDP and TCP)
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// DNS-over-TLS port
    #[arg(long)]
    dot_port: Option<u16>,

    /// Service domain; DoT clients connect to <client id>.<domain>
    #[arg(long, env = "TLS_DOMAIN")]
    tls_domain: Option<String>,

    /// Upstream DoH URLs, comma separated; `_CLIENTID_` is replaced per client
    #[arg(long, env = "UPSTREAM_DOH", value_delimiter = ',')]
    upstream: Option<Vec<String>>,

    /// Attempts against the upstream pool before using the fallback
    #[arg(long, env = "UPSTREAM_RETRY_CNT")]
    retry_attempts: Option<u32>,

    /// Fallback DoH URL
    #[arg(long, env = "FALLBACK_DOH")]
    fallback: Option<String>,

    /// Per-attempt upstream timeout in milliseconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS")]
    upstream_timeout_ms: Option<u64>,

    /// Certificate storage directory
    #[arg(long, env = "CERT_DIR")]
    cert_dir: Option<String>,

    /// Preferred ACME certificate chain
    #[arg(long, env = "PREFERRED_CHAIN")]
    preferred_chain: Option<String>,

    /// ACME registration email
    #[arg(long, env = "EMAIL")]
    email: Option<String>,

    /// ACME DNS-01 challenge provider
    #[arg(long, env = "DNS_PROVIDER")]
    dns_provider: Option<String>,

    /// Renew certificates expiring within this many days
    #[arg(long)]
    renew_threshold_days: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind_address: self.bind.clone(),
            dns_port: self.dns_port,
            dot_port: self.dot_port,
            tls_domain: self.tls_domain.clone(),
            upstream_servers: self.upstream.clone(),
            retry_attempts: self.retry_attempts,
            fallback: self.fallback.clone(),
            upstream_timeout_ms: self.upstream_timeout_ms,
            cert_dir: self.cert_dir.clone(),
            preferred_chain: self.preferred_chain.clone(),
            email: self.email.clone(),
            dns_provider: self.dns_provider.clone(),
            renew_threshold_days: self.renew_threshold_days,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);

    info!("Starting Ferrous DoH v{}", env!("CARGO_PKG_VERSION"));
    bootstrap::log_config(&config);

    install_crypto_provider();
    let shutdown = CancellationToken::new();

    let dns_services = di::DnsServices::new(&config)?;
    let certificates = di::CertificateServices::start(&config, shutdown.child_token()).await?;

    let mut dns_server = DnsServer::new(
        ListenerConfig::from_server_config(&config.server)?,
        dns_services.handler,
        certificates.holder,
    )?
    .with_cancellation(shutdown.child_token());
    dns_server.start().await?;

    let outcome = tokio::select! {
        _ = server::shutdown_signal() => Ok(()),
        result = dns_server.wait() => result,
    };

    info!("Shutting down");
    shutdown.cancel();
    let stopped = dns_server.stop().await;

    if let Err(e) = &outcome {
        error!(error = %e, "DNS server failed");
    }
    outcome?;
    stopped?;

    info!("Server shutdown complete");
    Ok(())
}
