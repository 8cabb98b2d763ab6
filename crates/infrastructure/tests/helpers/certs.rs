use arc_swap::ArcSwap;
use ferrous_doh_infrastructure::tls::{CertificateHolder, CertificatePem, TlsCertificate};
use rustls::pki_types::CertificateDer;
use std::sync::Arc;

/// Self-signed pair for `names` plus the DER certificate, for client trust
/// stores.
pub fn generated_pem(names: &[&str]) -> (CertificatePem, CertificateDer<'static>) {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let generated = rcgen::generate_simple_self_signed(names).unwrap();
    let der = generated.cert.der().clone();
    (
        CertificatePem {
            cert_pem: generated.cert.pem().into_bytes(),
            key_pem: generated.key_pair.serialize_pem().into_bytes(),
        },
        der,
    )
}

/// Pair for `names` that expired on 2020-01-01.
pub fn expired_pem(names: &[&str]) -> CertificatePem {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let mut params = rcgen::CertificateParams::new(names).unwrap();
    params.not_before = rcgen::date_time_ymd(2019, 1, 1);
    params.not_after = rcgen::date_time_ymd(2020, 1, 1);
    let key = rcgen::KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();
    CertificatePem {
        cert_pem: cert.pem().into_bytes(),
        key_pem: key.serialize_pem().into_bytes(),
    }
}

pub fn tls_certificate(pem: &CertificatePem) -> Arc<TlsCertificate> {
    Arc::new(TlsCertificate::from_pem(&pem.cert_pem, &pem.key_pem).unwrap())
}

/// Holder that always serves the same certificate.
pub struct StaticHolder(pub Arc<TlsCertificate>);

impl CertificateHolder for StaticHolder {
    fn get_certificate(&self) -> Arc<TlsCertificate> {
        Arc::clone(&self.0)
    }
}

/// Holder whose certificate can be replaced while listeners are running.
pub struct SwappableHolder(ArcSwap<TlsCertificate>);

impl SwappableHolder {
    pub fn new(cert: Arc<TlsCertificate>) -> Self {
        Self(ArcSwap::new(cert))
    }

    pub fn swap(&self, cert: Arc<TlsCertificate>) {
        self.0.store(cert);
    }
}

impl CertificateHolder for SwappableHolder {
    fn get_certificate(&self) -> Arc<TlsCertificate> {
        self.0.load_full()
    }
}
