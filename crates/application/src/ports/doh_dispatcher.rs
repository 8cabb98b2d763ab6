use async_trait::async_trait;
use ferrous_doh_domain::{ClientContext, DomainError};
use hickory_proto::op::Message;

/// One upstream round trip for a DNS query.
///
/// Implementations perform exactly one attempt per call; retrying is the
/// caller's business.
#[async_trait]
pub trait DohDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        query: &Message,
        client: &ClientContext,
    ) -> Result<Message, DomainError>;
}
