//! DNS front door: UDP, TCP and DNS-over-TLS listeners sharing one request
//! handler.

pub mod connection;
mod framing;
pub mod handler;
mod sockets;
mod stream;
mod udp;

pub use connection::{DnsConnection, StreamConnection, TcpConnection, TlsConnection, UdpConnection};
pub use handler::DnsRequestHandler;

use crate::tls::{build_server_config, CertificateHolder};
use ferrous_doh_domain::config::ServerConfig;
use ferrous_doh_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use stream::StreamSettings;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Where and how the listeners bind.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub udp_addr: SocketAddr,
    pub tcp_addr: SocketAddr,
    pub tls_addr: SocketAddr,
    pub tcp_idle_timeout: Duration,
    pub tls_handshake_timeout: Duration,
}

impl ListenerConfig {
    pub fn from_server_config(config: &ServerConfig) -> Result<Self, DomainError> {
        let ip: IpAddr = config.bind_address.parse().map_err(|e| {
            DomainError::ConfigError(format!(
                "Invalid bind address '{}': {e}",
                config.bind_address
            ))
        })?;

        Ok(Self {
            udp_addr: SocketAddr::new(ip, config.dns_port),
            tcp_addr: SocketAddr::new(ip, config.dns_port),
            tls_addr: SocketAddr::new(ip, config.dot_port),
            tcp_idle_timeout: Duration::from_secs(config.tcp_idle_timeout_secs),
            tls_handshake_timeout: Duration::from_secs(config.tls_handshake_timeout_secs),
        })
    }
}

/// Addresses the listeners actually bound, useful with port 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundAddrs {
    pub udp: SocketAddr,
    pub tcp: SocketAddr,
    pub tls: SocketAddr,
}

type ListenerResult = (&'static str, Result<(), DomainError>);

/// Runs the three listeners. Started once, stopped once.
pub struct DnsServer {
    listeners: ListenerConfig,
    handler: Arc<DnsRequestHandler>,
    acceptor: TlsAcceptor,
    shutdown: CancellationToken,
    tasks: JoinSet<ListenerResult>,
    started: bool,
}

impl DnsServer {
    pub fn new(
        listeners: ListenerConfig,
        handler: Arc<DnsRequestHandler>,
        holder: Arc<dyn CertificateHolder>,
    ) -> Result<Self, DomainError> {
        let acceptor = TlsAcceptor::from(build_server_config(holder)?);

        Ok(Self {
            listeners,
            handler,
            acceptor,
            shutdown: CancellationToken::new(),
            tasks: JoinSet::new(),
            started: false,
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Binds every listener, then spawns their accept loops and returns.
    /// Nothing is spawned unless all three binds succeed.
    pub async fn start(&mut self) -> Result<BoundAddrs, DomainError> {
        if self.started {
            return Err(DomainError::listener("server", "already started"));
        }

        let udp = sockets::bind_udp(self.listeners.udp_addr)
            .map_err(|e| bind_error("udp", self.listeners.udp_addr, e))?;
        let tcp = sockets::bind_tcp(self.listeners.tcp_addr)
            .map_err(|e| bind_error("tcp", self.listeners.tcp_addr, e))?;
        let tls = sockets::bind_tcp(self.listeners.tls_addr)
            .map_err(|e| bind_error("tls", self.listeners.tls_addr, e))?;

        let bound = BoundAddrs {
            udp: udp.local_addr().map_err(|e| DomainError::listener("udp", e))?,
            tcp: tcp.local_addr().map_err(|e| DomainError::listener("tcp", e))?,
            tls: tls.local_addr().map_err(|e| DomainError::listener("tls", e))?,
        };
        self.started = true;

        let settings = StreamSettings {
            handler: Arc::clone(&self.handler),
            idle_timeout: self.listeners.tcp_idle_timeout,
            shutdown: self.shutdown.clone(),
        };

        let handler = Arc::clone(&self.handler);
        let shutdown = self.shutdown.clone();
        self.tasks.spawn(async move {
            ("udp", udp::serve_udp(Arc::new(udp), handler, shutdown).await)
        });

        let tcp_settings = settings.clone();
        self.tasks
            .spawn(async move { ("tcp", stream::serve_tcp(tcp, tcp_settings).await) });

        let acceptor = self.acceptor.clone();
        let handshake_timeout = self.listeners.tls_handshake_timeout;
        self.tasks.spawn(async move {
            (
                "tls",
                stream::serve_tls(tls, acceptor, handshake_timeout, settings).await,
            )
        });

        info!(address = %bound.udp, "UDP listener is up and running");
        info!(address = %bound.tcp, "TCP listener is up and running");
        info!(address = %bound.tls, "DoT listener is up and running");

        Ok(bound)
    }

    /// Resolves when the first listener terminates. Outside of a requested
    /// shutdown that is always an error.
    pub async fn wait(&mut self) -> Result<(), DomainError> {
        match self.tasks.join_next().await {
            None => Ok(()),
            Some(Ok((_, Ok(())))) if self.shutdown.is_cancelled() => Ok(()),
            Some(Ok((name, Ok(())))) => Err(DomainError::listener(name, "stopped unexpectedly")),
            Some(Ok((_, Err(e)))) => Err(e),
            Some(Err(e)) => Err(DomainError::listener("server", e)),
        }
    }

    /// Stops accepting new work and waits for the accept loops to finish.
    /// Queries already being resolved are left to complete on their own.
    pub async fn stop(mut self) -> Result<(), DomainError> {
        self.shutdown.cancel();

        let mut first_error = None;
        while let Some(joined) = self.tasks.join_next().await {
            let result = match joined {
                Ok((_, result)) => result,
                Err(e) => Err(DomainError::listener("server", e)),
            };
            if let Err(e) = result {
                error!(error = %e, "Listener failed during shutdown");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("DNS server stopped");
                Ok(())
            }
        }
    }
}

fn bind_error(listener: &'static str, addr: SocketAddr, e: std::io::Error) -> DomainError {
    DomainError::listener(listener, format!("failed to bind {addr}: {e}"))
}
