use super::connection::UdpConnection;
use super::handler::DnsRequestHandler;
use super::sockets::is_transient_recv_error;
use ferrous_doh_domain::transport::MAX_STREAM_MESSAGE_SIZE;
use ferrous_doh_domain::DomainError;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Receives datagrams until cancelled, one task per query.
pub(crate) async fn serve_udp(
    socket: Arc<UdpSocket>,
    handler: Arc<DnsRequestHandler>,
    shutdown: CancellationToken,
) -> Result<(), DomainError> {
    let mut recv_buf = vec![0u8; MAX_STREAM_MESSAGE_SIZE];

    loop {
        let (len, peer) = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("UDP listener: shutting down");
                return Ok(());
            }
            received = socket.recv_from(&mut recv_buf) => match received {
                Ok(received) => received,
                Err(e) if is_transient_recv_error(&e) => {
                    debug!(error = %e, "Ignoring UDP receive error");
                    continue;
                }
                Err(e) => return Err(DomainError::listener("udp", e)),
            },
        };

        let query = recv_buf[..len].to_vec();
        let connection = UdpConnection::new(Arc::clone(&socket), peer);
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            handler.handle(&query, &connection).await;
        });
    }
}
