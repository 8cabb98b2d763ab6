use ferrous_doh_domain::DomainError;
use rustls::pki_types::CertificateDer;
use rustls::sign::CertifiedKey;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use x509_parser::extensions::GeneralName;

/// Installs aws-lc-rs as the process-wide rustls provider. Safe to call more
/// than once; later calls are no-ops.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Certificate chain and private key, usable by the DoT listener.
///
/// Immutable once built. Replacing the served certificate means swapping the
/// whole value.
#[derive(Clone)]
pub struct TlsCertificate {
    certified_key: Arc<CertifiedKey>,
    dns_names: Vec<String>,
    not_after: i64,
}

impl TlsCertificate {
    /// Parses a PEM chain (leaf first) and a PEM private key.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self, DomainError> {
        let chain = rustls_pemfile::certs(&mut &cert_pem[..])
            .collect::<Result<Vec<CertificateDer<'static>>, _>>()
            .map_err(|e| DomainError::Certificate(format!("Invalid certificate PEM: {e}")))?;
        let Some(leaf) = chain.first() else {
            return Err(DomainError::Certificate(
                "Certificate PEM contains no certificates".into(),
            ));
        };

        let (dns_names, not_after) = inspect_leaf(leaf)?;

        let key = rustls_pemfile::private_key(&mut &key_pem[..])
            .map_err(|e| DomainError::Certificate(format!("Invalid private key PEM: {e}")))?
            .ok_or_else(|| DomainError::Certificate("Key PEM contains no private key".into()))?;

        let signing_key = rustls::crypto::aws_lc_rs::sign::any_supported_type(&key)
            .map_err(|e| DomainError::Certificate(format!("Unsupported private key: {e}")))?;

        Ok(Self {
            certified_key: Arc::new(CertifiedKey::new(chain, signing_key)),
            dns_names,
            not_after,
        })
    }

    pub fn certified_key(&self) -> Arc<CertifiedKey> {
        Arc::clone(&self.certified_key)
    }

    pub fn chain_len(&self) -> usize {
        self.certified_key.cert.len()
    }

    /// DNS subject alternative names of the leaf certificate.
    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    pub fn not_after(&self) -> SystemTime {
        match u64::try_from(self.not_after) {
            Ok(secs) => UNIX_EPOCH + Duration::from_secs(secs),
            Err(_) => UNIX_EPOCH,
        }
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining_validity(&self) -> Duration {
        self.not_after()
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_validity().is_zero()
    }

    pub fn expires_within(&self, threshold: Duration) -> bool {
        self.remaining_validity() <= threshold
    }

    /// Whether the leaf is valid for `hostname`, honouring single-label
    /// wildcards (`*.example.com` covers `abc.example.com`).
    pub fn covers(&self, hostname: &str) -> bool {
        let hostname = hostname.trim_end_matches('.');
        self.dns_names.iter().any(|name| {
            if let Some(suffix) = name.strip_prefix("*.") {
                match hostname.split_once('.') {
                    Some((label, rest)) => !label.is_empty() && rest.eq_ignore_ascii_case(suffix),
                    None => false,
                }
            } else {
                name.eq_ignore_ascii_case(hostname)
            }
        })
    }
}

impl fmt::Debug for TlsCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsCertificate")
            .field("dns_names", &self.dns_names)
            .field("not_after", &self.not_after)
            .field("chain_len", &self.chain_len())
            .finish()
    }
}

fn inspect_leaf(leaf: &CertificateDer<'_>) -> Result<(Vec<String>, i64), DomainError> {
    let (_, cert) = x509_parser::parse_x509_certificate(leaf.as_ref())
        .map_err(|e| DomainError::Certificate(format!("Invalid leaf certificate: {e}")))?;

    let dns_names = cert
        .subject_alternative_name()
        .map_err(|e| DomainError::Certificate(format!("Invalid subjectAltName: {e}")))?
        .map(|san| {
            san.value
                .general_names
                .iter()
                .filter_map(|name| match name {
                    GeneralName::DNSName(dns) => Some(dns.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok((dns_names, cert.validity().not_after.timestamp()))
}
