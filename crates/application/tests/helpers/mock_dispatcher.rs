use super::answer_with_records;
use async_trait::async_trait;
use ferrous_doh_application::ports::DohDispatcher;
use ferrous_doh_domain::{ClientContext, DomainError};
use hickory_proto::op::Message;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Dispatcher that fails a scripted number of times, then answers.
pub struct MockDohDispatcher {
    calls: AtomicU32,
    failures_before_success: u32,
    answer_records: usize,
    response_id: Option<u16>,
    seen_clients: Mutex<Vec<ClientContext>>,
}

impl MockDohDispatcher {
    pub fn answering(answer_records: usize) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures_before_success: 0,
            answer_records,
            response_id: None,
            seen_clients: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::answering(1).fail_first(u32::MAX)
    }

    pub fn fail_first(mut self, failures: u32) -> Self {
        self.failures_before_success = failures;
        self
    }

    /// Answer with a different transaction id than the query carried.
    pub fn with_response_id(mut self, id: u16) -> Self {
        self.response_id = Some(id);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_clients(&self) -> Vec<ClientContext> {
        self.seen_clients.lock().unwrap().clone()
    }
}

#[async_trait]
impl DohDispatcher for MockDohDispatcher {
    async fn dispatch(
        &self,
        query: &Message,
        client: &ClientContext,
    ) -> Result<Message, DomainError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_clients.lock().unwrap().push(client.clone());

        if call < self.failures_before_success {
            return Err(DomainError::UpstreamStatus {
                upstream: "https://mock.invalid/dns-query".to_string(),
                status: 502,
            });
        }

        let mut response = answer_with_records(query, self.answer_records);
        if let Some(id) = self.response_id {
            response.set_id(id);
        }
        Ok(response)
    }
}
