use super::holder::CertificateHolder;
use ferrous_doh_domain::{matches_service_domain, DomainError};
use rustls::server::{ClientHello, ResolvesServerCert};
use rustls::sign::CertifiedKey;
use rustls::ServerConfig;
use std::fmt;
use std::sync::Arc;

/// Resolves the server certificate from the holder on every handshake, so a
/// refreshed certificate is used by the next connection without rebuilding
/// the acceptor.
pub struct HolderCertResolver {
    holder: Arc<dyn CertificateHolder>,
}

impl HolderCertResolver {
    pub fn new(holder: Arc<dyn CertificateHolder>) -> Self {
        Self { holder }
    }
}

impl fmt::Debug for HolderCertResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HolderCertResolver").finish_non_exhaustive()
    }
}

impl ResolvesServerCert for HolderCertResolver {
    fn resolve(&self, _client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        Some(self.holder.get_certificate().certified_key())
    }
}

/// rustls server configuration for the DoT listener: TLS 1.2 and 1.3, no
/// client authentication, certificate taken from the holder.
pub fn build_server_config(
    holder: Arc<dyn CertificateHolder>,
) -> Result<Arc<ServerConfig>, DomainError> {
    let config = ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::aws_lc_rs::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| DomainError::Certificate(format!("Invalid TLS configuration: {e}")))?
    .with_no_client_auth()
    .with_cert_resolver(Arc::new(HolderCertResolver::new(holder)));

    Ok(Arc::new(config))
}

/// Checks the SNI negotiated by a DoT client against the service domain and
/// returns it.
pub fn verify_server_name<'a>(
    server_name: Option<&'a str>,
    service_domain: &str,
) -> Result<&'a str, DomainError> {
    match server_name {
        Some(name) if matches_service_domain(name, service_domain) => Ok(name),
        Some(name) => Err(DomainError::listener(
            "tls",
            format!("server name '{name}' is outside '{service_domain}'"),
        )),
        None => Err(DomainError::listener("tls", "client sent no server name")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_name_inside_service_domain() {
        assert_eq!(
            verify_server_name(Some("abc.Example.com"), "example.com").unwrap(),
            "abc.Example.com"
        );
        assert!(verify_server_name(Some("example.com"), "example.com").is_ok());
    }

    #[test]
    fn test_server_name_outside_service_domain() {
        assert!(verify_server_name(Some("abc.example.org"), "example.com").is_err());
        assert!(verify_server_name(None, "example.com").is_err());
    }
}
