use std::fmt;

/// Classic DNS minimum message size (RFC 1035 §2.3.4).
pub const MIN_UDP_MESSAGE_SIZE: usize = 512;

/// Largest message a 2-byte length prefix can frame.
pub const MAX_STREAM_MESSAGE_SIZE: usize = 65535;

/// The transport a query arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Udp,
    Tcp,
    Tls,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
            Self::Tls => "tls",
        }
    }

    pub fn is_stream(&self) -> bool {
        !matches!(self, Self::Udp)
    }

    /// Largest response that may be written back on this transport.
    ///
    /// UDP honours an EDNS0 advertised payload above 512 bytes. Stream
    /// transports (TCP and DoT) always allow the framing maximum.
    pub fn max_response_size(&self, edns_payload: Option<u16>) -> usize {
        if self.is_stream() {
            return MAX_STREAM_MESSAGE_SIZE;
        }

        match edns_payload {
            Some(size) => (size as usize).max(MIN_UDP_MESSAGE_SIZE),
            None => MIN_UDP_MESSAGE_SIZE,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
