//! Ferrous DoH Domain Layer
pub mod client_context;
pub mod config;
pub mod errors;
pub mod transport;

pub use client_context::{derive_client_id, matches_service_domain, ClientContext};
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use transport::TransportKind;
