pub mod acceptor;
pub mod certificate;
pub mod holder;
pub mod issuer;
pub mod manager;
pub mod repository;

pub use acceptor::{build_server_config, verify_server_name, HolderCertResolver};
pub use certificate::{install_crypto_provider, TlsCertificate};
pub use holder::{CertificateHolder, RefreshingCertificateHolder};
pub use issuer::{CertificateIssuer, SelfSignedIssuer};
pub use manager::{CertificateManager, LocalCertificateManager};
pub use repository::{CertificatePem, CertificateRepository, FileCertificateRepository};
