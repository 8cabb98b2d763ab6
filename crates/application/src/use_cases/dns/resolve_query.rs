use crate::ports::DohDispatcher;
use ferrous_doh_domain::{ClientContext, DomainError};
use hickory_proto::op::Message;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Bounded retry against the primary upstream pool, then a single attempt
/// against the fallback resolver.
///
/// Attempts are strictly sequential and immediate; there is no backoff.
pub struct ResolveQueryUseCase {
    primary: Arc<dyn DohDispatcher>,
    fallback: Arc<dyn DohDispatcher>,
    retry_attempts: u32,
}

impl ResolveQueryUseCase {
    pub fn new(
        primary: Arc<dyn DohDispatcher>,
        fallback: Arc<dyn DohDispatcher>,
        retry_attempts: u32,
    ) -> Self {
        Self {
            primary,
            fallback,
            retry_attempts: retry_attempts.max(1),
        }
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    pub async fn execute(
        &self,
        query: &Message,
        client: &ClientContext,
    ) -> Result<Message, DomainError> {
        for attempt in 1..=self.retry_attempts {
            match self.primary.dispatch(query, client).await {
                Ok(response) => {
                    if attempt > 1 {
                        debug!(attempt, "Upstream answered after retry");
                    }
                    return Ok(response);
                }
                Err(e) => {
                    debug!(
                        attempt,
                        max_attempts = self.retry_attempts,
                        error = %e,
                        "Upstream attempt failed"
                    );
                }
            }
        }

        warn!(
            attempts = self.retry_attempts,
            query_id = query.id(),
            "All upstream attempts failed, using fallback resolver"
        );

        self.fallback.dispatch(query, client).await.map_err(|e| {
            error!(error = %e, query_id = query.id(), "Fallback resolver failed, giving up");
            DomainError::Exhausted {
                attempts: self.retry_attempts,
                last_error: e.to_string(),
            }
        })
    }
}
