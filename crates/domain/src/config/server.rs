use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Plain DNS port, shared by the UDP and TCP listeners
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// DNS-over-TLS port
    #[serde(default = "default_dot_port")]
    pub dot_port: u16,

    /// Idle time after which a TCP or DoT connection without queries is closed
    #[serde(default = "default_tcp_idle_timeout_secs")]
    pub tcp_idle_timeout_secs: u64,

    #[serde(default = "default_tls_handshake_timeout_secs")]
    pub tls_handshake_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            dns_port: default_dns_port(),
            dot_port: default_dot_port(),
            tcp_idle_timeout_secs: default_tcp_idle_timeout_secs(),
            tls_handshake_timeout_secs: default_tls_handshake_timeout_secs(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_dns_port() -> u16 {
    53
}

fn default_dot_port() -> u16 {
    853
}

fn default_tcp_idle_timeout_secs() -> u64 {
    10
}

fn default_tls_handshake_timeout_secs() -> u64 {
    5
}
