#![allow(dead_code)]

pub mod certs;
pub mod dispatcher;
pub mod messages;
pub mod upstream;

pub use certs::{expired_pem, generated_pem, StaticHolder, SwappableHolder};
pub use dispatcher::RecordingDispatcher;
pub use messages::{a_query, answer_with_records, edns_query};
pub use upstream::{DohUpstream, UpstreamBehavior};
