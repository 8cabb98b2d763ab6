//! Ferrous DoH Application Layer
pub mod dns;
pub mod ports;
pub mod use_cases;
