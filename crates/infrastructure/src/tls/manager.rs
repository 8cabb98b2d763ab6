use super::certificate::TlsCertificate;
use super::issuer::CertificateIssuer;
use super::repository::{CertificatePem, CertificateRepository};
use async_trait::async_trait;
use ferrous_doh_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const SECONDS_PER_DAY: u64 = 86_400;

/// Produces the certificate the DoT listener should serve right now.
#[async_trait]
pub trait CertificateManager: Send + Sync {
    async fn retrieve_certificate(&self) -> Result<Arc<TlsCertificate>, DomainError>;
}

/// Serves the stored certificate while it is usable and asks the issuer for
/// a new one otherwise.
///
/// A stored certificate is replaced when it is missing, unreadable, expired,
/// not valid for the service domain or due to expire within the renewal
/// threshold.
pub struct LocalCertificateManager {
    repository: Arc<dyn CertificateRepository>,
    issuer: Arc<dyn CertificateIssuer>,
    domain: String,
    renew_threshold: Duration,
}

impl LocalCertificateManager {
    pub fn new(
        repository: Arc<dyn CertificateRepository>,
        issuer: Arc<dyn CertificateIssuer>,
        domain: impl Into<String>,
        renew_threshold: Duration,
    ) -> Self {
        Self {
            repository,
            issuer,
            domain: domain.into(),
            renew_threshold,
        }
    }

    /// Names requested from the issuer: the domain and its wildcard.
    pub fn requested_names(&self) -> Vec<String> {
        vec![self.domain.clone(), format!("*.{}", self.domain)]
    }

    async fn load_stored(&self) -> Option<TlsCertificate> {
        let pem = match self.repository.load_certificate(&self.domain).await {
            Ok(Some(pem)) => pem,
            Ok(None) => {
                info!(domain = %self.domain, "No stored certificate found");
                return None;
            }
            Err(e) => {
                warn!(domain = %self.domain, error = %e, "Failed to load stored certificate");
                return None;
            }
        };

        let cert = match TlsCertificate::from_pem(&pem.cert_pem, &pem.key_pem) {
            Ok(cert) => cert,
            Err(e) => {
                warn!(domain = %self.domain, error = %e, "Stored certificate is unusable");
                return None;
            }
        };

        if !cert.covers(&self.domain) {
            warn!(
                domain = %self.domain,
                names = ?cert.dns_names(),
                "Stored certificate is not valid for the service domain"
            );
            return None;
        }

        if cert.is_expired() {
            warn!(domain = %self.domain, "Stored certificate has expired");
            return None;
        }

        let days_left = cert.remaining_validity().as_secs() / SECONDS_PER_DAY;
        if cert.expires_within(self.renew_threshold) {
            info!(domain = %self.domain, days_left, "Stored certificate is due for renewal");
            return None;
        }

        info!(domain = %self.domain, days_left, "Using stored certificate");
        Some(cert)
    }

    async fn issue(&self) -> Result<TlsCertificate, DomainError> {
        let names = self.requested_names();
        info!(
            domain = %self.domain,
            issuer = self.issuer.name(),
            "Requesting new certificate"
        );

        let CertificatePem { cert_pem, key_pem } = self.issuer.issue(&names).await?;
        let cert = TlsCertificate::from_pem(&cert_pem, &key_pem)?;

        let pem = CertificatePem { cert_pem, key_pem };
        if let Err(e) = self.repository.store_certificate(&self.domain, &pem).await {
            error!(domain = %self.domain, error = %e, "Failed to store new certificate");
        }

        Ok(cert)
    }
}

#[async_trait]
impl CertificateManager for LocalCertificateManager {
    async fn retrieve_certificate(&self) -> Result<Arc<TlsCertificate>, DomainError> {
        if let Some(cert) = self.load_stored().await {
            return Ok(Arc::new(cert));
        }
        self.issue().await.map(Arc::new)
    }
}
