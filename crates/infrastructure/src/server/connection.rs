use super::framing::write_frame;
use async_trait::async_trait;
use ferrous_doh_domain::{DomainError, TransportKind};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncWrite, WriteHalf};
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::Mutex;
use tokio_rustls::server::TlsStream;

/// What the request handler needs to know about, and do with, the
/// connection a query arrived on.
#[async_trait]
pub trait DnsConnection: Send + Sync {
    fn transport(&self) -> TransportKind;

    fn peer_addr(&self) -> Option<SocketAddr>;

    /// TLS server name negotiated by the client, if any.
    fn server_name(&self) -> Option<&str> {
        None
    }

    async fn write_response(&self, wire: &[u8]) -> Result<(), DomainError>;
}

/// Answers one datagram by sending back to its source address.
pub struct UdpConnection {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpConnection {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }
}

#[async_trait]
impl DnsConnection for UdpConnection {
    fn transport(&self) -> TransportKind {
        TransportKind::Udp
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }

    async fn write_response(&self, wire: &[u8]) -> Result<(), DomainError> {
        self.socket
            .send_to(wire, self.peer)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::IoError(format!("UDP send to {} failed: {e}", self.peer)))
    }
}

/// One message on a length-framed stream. The write half is shared by every
/// in-flight query of the connection and locked per response.
pub struct StreamConnection<W> {
    writer: Arc<Mutex<W>>,
    peer: SocketAddr,
    server_name: Option<Arc<str>>,
    transport: TransportKind,
}

pub type TcpConnection = StreamConnection<WriteHalf<TcpStream>>;
pub type TlsConnection = StreamConnection<WriteHalf<TlsStream<TcpStream>>>;

impl<W> StreamConnection<W> {
    pub fn tcp(writer: Arc<Mutex<W>>, peer: SocketAddr) -> Self {
        Self {
            writer,
            peer,
            server_name: None,
            transport: TransportKind::Tcp,
        }
    }

    pub fn tls(writer: Arc<Mutex<W>>, peer: SocketAddr, server_name: Option<Arc<str>>) -> Self {
        Self {
            writer,
            peer,
            server_name,
            transport: TransportKind::Tls,
        }
    }
}

#[async_trait]
impl<W> DnsConnection for StreamConnection<W>
where
    W: AsyncWrite + Send + Unpin,
{
    fn transport(&self) -> TransportKind {
        self.transport
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }

    fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    async fn write_response(&self, wire: &[u8]) -> Result<(), DomainError> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, wire).await.map_err(|e| {
            DomainError::IoError(format!(
                "{} write to {} failed: {e}",
                self.transport, self.peer
            ))
        })
    }
}
