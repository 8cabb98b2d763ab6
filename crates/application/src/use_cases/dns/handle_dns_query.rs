use super::ResolveQueryUseCase;
use crate::dns::{edns_payload, encode_message, server_failure, truncate_to};
use ferrous_doh_domain::{ClientContext, DomainError, TransportKind};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, trace};

/// Transport-independent part of answering one query: resolve through the
/// upstream policy, shape the answer for the transport, encode it.
///
/// Every query gets exactly one answer. When the upstream policy is
/// exhausted the answer is a SERVFAIL echoing the query header.
pub struct HandleDnsQueryUseCase {
    resolver: Arc<ResolveQueryUseCase>,
}

impl HandleDnsQueryUseCase {
    pub fn new(resolver: Arc<ResolveQueryUseCase>) -> Self {
        Self { resolver }
    }

    pub async fn execute(
        &self,
        query: &Message,
        client: &ClientContext,
        transport: TransportKind,
    ) -> Result<Vec<u8>, DomainError> {
        let start = Instant::now();
        let max_size = transport.max_response_size(edns_payload(query));

        trace!(
            query_id = query.id(),
            transport = %transport,
            client_ip = ?client.client_ip,
            client_id = %client.client_id,
            max_size,
            "Handling DNS query"
        );

        let wire = match self.resolver.execute(query, client).await {
            Ok(mut response) => match finalize_response(query, &mut response, max_size) {
                Ok(wire) => wire,
                Err(e) => {
                    error!(error = %e, query_id = query.id(), "Failed to encode upstream response");
                    encode_message(&server_failure(query))?
                }
            },
            Err(e) => {
                debug!(error = %e, query_id = query.id(), "Answering with SERVFAIL");
                encode_message(&server_failure(query))?
            }
        };

        debug!(
            query_id = query.id(),
            transport = %transport,
            response_len = wire.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Query answered"
        );

        Ok(wire)
    }
}

/// Applies the proxy's response rules and encodes the result.
///
/// The query id is stamped on the response, RA mirrors the query's RD (the
/// proxy performs no recursion itself) and the message is truncated to
/// `max_size`.
fn finalize_response(
    query: &Message,
    response: &mut Message,
    max_size: usize,
) -> Result<Vec<u8>, DomainError> {
    response.set_id(query.id());
    response.set_recursion_available(query.recursion_desired());

    if truncate_to(response, max_size)? {
        debug!(
            query_id = query.id(),
            max_size,
            truncated = response.truncated(),
            "Response truncated"
        );
    }

    encode_message(response)
}
