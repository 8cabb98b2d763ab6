//! Accept loops for the length-framed transports, plain TCP and DoT.

use super::connection::StreamConnection;
use super::framing::read_frame;
use super::handler::DnsRequestHandler;
use super::sockets::is_transient_accept_error;
use crate::tls::verify_server_name;
use ferrous_doh_domain::{DomainError, TransportKind};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub(crate) struct StreamSettings {
    pub handler: Arc<DnsRequestHandler>,
    pub idle_timeout: Duration,
    pub shutdown: CancellationToken,
}

pub(crate) async fn serve_tcp(
    listener: TcpListener,
    settings: StreamSettings,
) -> Result<(), DomainError> {
    loop {
        let Some((stream, peer)) = accept(&listener, "tcp", &settings.shutdown).await? else {
            info!("TCP listener: shutting down");
            return Ok(());
        };

        let settings = settings.clone();
        tokio::spawn(async move {
            serve_connection(stream, peer, None, TransportKind::Tcp, settings).await;
        });
    }
}

pub(crate) async fn serve_tls(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    handshake_timeout: Duration,
    settings: StreamSettings,
) -> Result<(), DomainError> {
    loop {
        let Some((stream, peer)) = accept(&listener, "tls", &settings.shutdown).await? else {
            info!("DoT listener: shutting down");
            return Ok(());
        };

        let acceptor = acceptor.clone();
        let settings = settings.clone();
        tokio::spawn(async move {
            let mut tls_stream =
                match tokio::time::timeout(handshake_timeout, acceptor.accept(stream)).await {
                    Ok(Ok(tls_stream)) => tls_stream,
                    Ok(Err(e)) => {
                        debug!(peer = %peer, error = %e, "TLS handshake failed");
                        return;
                    }
                    Err(_) => {
                        debug!(peer = %peer, "TLS handshake timed out");
                        return;
                    }
                };

            let server_name = tls_stream.get_ref().1.server_name().map(Arc::<str>::from);
            if let Err(e) =
                verify_server_name(server_name.as_deref(), settings.handler.service_domain())
            {
                warn!(peer = %peer, error = %e, "Rejecting DoT connection");
                let _ = tls_stream.shutdown().await;
                return;
            }

            serve_connection(tls_stream, peer, server_name, TransportKind::Tls, settings).await;
        });
    }
}

/// `Ok(None)` once shutdown was requested.
async fn accept(
    listener: &TcpListener,
    name: &'static str,
    shutdown: &CancellationToken,
) -> Result<Option<(TcpStream, SocketAddr)>, DomainError> {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(None),
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let _ = stream.set_nodelay(true);
                    return Ok(Some((stream, peer)));
                }
                Err(e) if is_transient_accept_error(&e) => {
                    warn!(listener = name, error = %e, "Accept failed, retrying");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
                Err(e) => return Err(DomainError::listener(name, e)),
            },
        }
    }
}

/// Reads framed queries until the peer closes, goes idle or shutdown is
/// requested. Each query is answered by its own task so a slow upstream
/// does not hold up the rest of the pipeline.
async fn serve_connection<S>(
    stream: S,
    peer: SocketAddr,
    server_name: Option<Arc<str>>,
    transport: TransportKind,
    settings: StreamSettings,
) where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let (mut reader, writer) = tokio::io::split(stream);
    let writer = Arc::new(Mutex::new(writer));

    loop {
        let read = tokio::select! {
            _ = settings.shutdown.cancelled() => break,
            read = tokio::time::timeout(settings.idle_timeout, read_frame(&mut reader)) => read,
        };

        let query = match read {
            Ok(Ok(Some(query))) => query,
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                debug!(peer = %peer, transport = %transport, error = %e, "Closing connection after read error");
                break;
            }
            Err(_) => {
                trace!(peer = %peer, transport = %transport, "Closing idle connection");
                break;
            }
        };

        let connection = match transport {
            TransportKind::Tls => {
                StreamConnection::tls(Arc::clone(&writer), peer, server_name.clone())
            }
            _ => StreamConnection::tcp(Arc::clone(&writer), peer),
        };
        let handler = Arc::clone(&settings.handler);
        tokio::spawn(async move {
            handler.handle(&query, &connection).await;
        });
    }

    trace!(peer = %peer, transport = %transport, "Connection closed");
}

