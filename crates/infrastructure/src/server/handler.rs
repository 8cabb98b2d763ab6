use super::connection::DnsConnection;
use ferrous_doh_application::dns::{decode_message, encode_message, format_error, peek_message_id};
use ferrous_doh_application::use_cases::HandleDnsQueryUseCase;
use ferrous_doh_domain::ClientContext;
use std::sync::Arc;
use tracing::{debug, error};

/// Shared by all listeners: decode, resolve, answer on the same connection.
pub struct DnsRequestHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
    service_domain: Arc<str>,
}

impl DnsRequestHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>, service_domain: impl AsRef<str>) -> Self {
        Self {
            use_case,
            service_domain: Arc::from(service_domain.as_ref()),
        }
    }

    pub fn service_domain(&self) -> &str {
        &self.service_domain
    }

    /// Answers one raw query. Never fails: undecodable input gets FORMERR
    /// (or is dropped when not even the header is present) and write errors
    /// are logged.
    pub async fn handle<C>(&self, raw: &[u8], connection: &C)
    where
        C: DnsConnection + ?Sized,
    {
        let transport = connection.transport();
        let peer = connection.peer_addr();

        let wire = match decode_message(raw) {
            Ok(query) => {
                let client = ClientContext::from_transport(
                    peer.map(|addr| addr.ip().to_canonical()),
                    connection.server_name(),
                    &self.service_domain,
                );
                match self.use_case.execute(&query, &client, transport).await {
                    Ok(wire) => wire,
                    Err(e) => {
                        error!(error = %e, transport = %transport, "Failed to build response");
                        return;
                    }
                }
            }
            Err(e) => match peek_message_id(raw) {
                Some(id) => {
                    debug!(error = %e, transport = %transport, peer = ?peer, "Malformed query, answering FORMERR");
                    match encode_message(&format_error(id)) {
                        Ok(wire) => wire,
                        Err(e) => {
                            error!(error = %e, "Failed to encode FORMERR response");
                            return;
                        }
                    }
                }
                None => {
                    debug!(transport = %transport, peer = ?peer, len = raw.len(), "Dropping message shorter than a DNS header");
                    return;
                }
            },
        };

        if let Err(e) = connection.write_response(&wire).await {
            error!(error = %e, transport = %transport, peer = ?peer, "Failed to write response");
        }
    }
}
