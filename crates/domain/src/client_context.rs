use std::net::IpAddr;

/// Per-request data forwarded to the upstream resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    /// Address of the peer that sent the query, when the transport exposes one.
    pub client_ip: Option<IpAddr>,

    /// Identifier taken from the TLS server name; empty for plain UDP/TCP.
    pub client_id: String,
}

impl ClientContext {
    pub fn new(client_ip: Option<IpAddr>, client_id: impl Into<String>) -> Self {
        Self {
            client_ip,
            client_id: client_id.into(),
        }
    }

    /// Builds the context from the transport facts of one request.
    pub fn from_transport(
        client_ip: Option<IpAddr>,
        server_name: Option<&str>,
        service_domain: &str,
    ) -> Self {
        Self {
            client_ip,
            client_id: derive_client_id(server_name, service_domain),
        }
    }
}

/// Strips the service domain suffix and every `.` separator from the
/// negotiated TLS server name.
///
/// `abc.example.com` with service domain `example.com` yields `abc`, the bare
/// service domain yields an empty identifier, and so does a missing name.
pub fn derive_client_id(server_name: Option<&str>, service_domain: &str) -> String {
    let Some(name) = server_name else {
        return String::new();
    };

    let prefix = match strip_suffix_ignore_case(name, service_domain) {
        Some(prefix) => prefix,
        None => name,
    };

    prefix.chars().filter(|c| *c != '.').collect()
}

/// True when `server_name` ends with `service_domain`, ignoring ASCII case.
pub fn matches_service_domain(server_name: &str, service_domain: &str) -> bool {
    strip_suffix_ignore_case(server_name, service_domain).is_some()
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.len() > value.len() {
        return None;
    }
    let split = value.len() - suffix.len();
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
