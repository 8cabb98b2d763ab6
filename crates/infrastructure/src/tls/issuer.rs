use super::repository::CertificatePem;
use async_trait::async_trait;
use ferrous_doh_domain::DomainError;
use tracing::warn;

/// Obtains a new certificate for a set of names.
///
/// An ACME DNS-01 client plugs in here. The bundled implementation only
/// self-signs.
#[async_trait]
pub trait CertificateIssuer: Send + Sync {
    async fn issue(&self, domains: &[String]) -> Result<CertificatePem, DomainError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SelfSignedIssuer;

#[async_trait]
impl CertificateIssuer for SelfSignedIssuer {
    async fn issue(&self, domains: &[String]) -> Result<CertificatePem, DomainError> {
        if domains.is_empty() {
            return Err(DomainError::Certificate(
                "Cannot issue a certificate without names".into(),
            ));
        }

        let generated = rcgen::generate_simple_self_signed(domains.to_vec())
            .map_err(|e| DomainError::Certificate(format!("Self-signed generation failed: {e}")))?;

        warn!(
            domains = ?domains,
            "Issued a self-signed certificate; DoT clients will not trust it"
        );

        Ok(CertificatePem {
            cert_pem: generated.cert.pem().into_bytes(),
            key_pem: generated.key_pair.serialize_pem().into_bytes(),
        })
    }

    fn name(&self) -> &'static str {
        "self-signed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::TlsCertificate;

    #[tokio::test]
    async fn test_issues_certificate_for_all_names() {
        let domains = vec!["example.com".to_string(), "*.example.com".to_string()];
        let pem = SelfSignedIssuer.issue(&domains).await.unwrap();

        let cert = TlsCertificate::from_pem(&pem.cert_pem, &pem.key_pem).unwrap();
        assert!(cert.covers("example.com"));
        assert!(cert.covers("abc.example.com"));
    }

    #[tokio::test]
    async fn test_rejects_empty_name_list() {
        assert!(SelfSignedIssuer.issue(&[]).await.is_err());
    }
}
