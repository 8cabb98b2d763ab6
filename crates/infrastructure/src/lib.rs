//! Ferrous DoH Infrastructure Layer
pub mod doh;
pub mod server;
pub mod tls;
