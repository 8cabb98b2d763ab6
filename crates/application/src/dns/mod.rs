mod codec;
mod reply;
mod truncation;

pub use codec::{decode_message, encode_message, peek_message_id};
pub use reply::{edns_payload, format_error, server_failure};
pub use truncation::truncate_to;
