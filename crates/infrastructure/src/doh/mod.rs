pub mod client;
pub mod endpoints;

pub use client::{DohClient, DNS_MESSAGE_CONTENT_TYPE, FORWARDED_FOR_HEADER};
pub use endpoints::{render_upstream_url, UpstreamEndpoints};
