use super::messages::answer_with_records;
use async_trait::async_trait;
use ferrous_doh_application::ports::DohDispatcher;
use ferrous_doh_domain::{ClientContext, DomainError};
use hickory_proto::op::Message;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Answers with `records` A records, or fails every call, and remembers the
/// client context of each call.
pub struct RecordingDispatcher {
    records: usize,
    fail: bool,
    calls: AtomicUsize,
    clients: Mutex<Vec<ClientContext>>,
}

impl RecordingDispatcher {
    pub fn answering(records: usize) -> Self {
        Self {
            records,
            fail: false,
            calls: AtomicUsize::new(0),
            clients: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::answering(0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_clients(&self) -> Vec<ClientContext> {
        self.clients.lock().unwrap().clone()
    }
}

#[async_trait]
impl DohDispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        query: &Message,
        client: &ClientContext,
    ) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.clients.lock().unwrap().push(client.clone());

        if self.fail {
            return Err(DomainError::UpstreamStatus {
                upstream: "mock".into(),
                status: 503,
            });
        }
        Ok(answer_with_records(query, self.records))
    }
}
