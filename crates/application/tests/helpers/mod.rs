#![allow(dead_code)]

mod messages;
mod mock_dispatcher;

pub use messages::{a_query, answer_with_records, edns_query};
pub use mock_dispatcher::MockDohDispatcher;
