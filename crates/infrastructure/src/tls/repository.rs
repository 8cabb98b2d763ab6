use async_trait::async_trait;
use ferrous_doh_domain::DomainError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// PEM encoded certificate chain and private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePem {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// `Ok(None)` when nothing is stored for `domain`.
    async fn load_certificate(&self, domain: &str) -> Result<Option<CertificatePem>, DomainError>;

    async fn store_certificate(&self, domain: &str, pem: &CertificatePem)
        -> Result<(), DomainError>;
}

/// Stores `<domain>.cert.pem` and `<domain>.key.pem` in one directory.
///
/// The directory is owner-only (0700) and both files are written 0600.
pub struct FileCertificateRepository {
    dir: PathBuf,
}

impl FileCertificateRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            DomainError::Certificate(format!(
                "Failed to create certificate directory {}: {e}",
                dir.display()
            ))
        })?;
        restrict_permissions(&dir, 0o700).map_err(|e| {
            DomainError::Certificate(format!("Failed to secure {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cert_path(&self, domain: &str) -> PathBuf {
        self.dir.join(format!("{domain}.cert.pem"))
    }

    pub fn key_path(&self, domain: &str) -> PathBuf {
        self.dir.join(format!("{domain}.key.pem"))
    }
}

#[async_trait]
impl CertificateRepository for FileCertificateRepository {
    async fn load_certificate(&self, domain: &str) -> Result<Option<CertificatePem>, DomainError> {
        let Some(cert_pem) = read_optional(&self.cert_path(domain)).await? else {
            return Ok(None);
        };
        let Some(key_pem) = read_optional(&self.key_path(domain)).await? else {
            return Ok(None);
        };

        debug!(domain = %domain, dir = %self.dir.display(), "Loaded stored certificate");
        Ok(Some(CertificatePem { cert_pem, key_pem }))
    }

    async fn store_certificate(
        &self,
        domain: &str,
        pem: &CertificatePem,
    ) -> Result<(), DomainError> {
        write_private(&self.key_path(domain), &pem.key_pem).await?;
        write_private(&self.cert_path(domain), &pem.cert_pem).await?;

        debug!(domain = %domain, dir = %self.dir.display(), "Stored certificate");
        Ok(())
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, DomainError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DomainError::Certificate(format!(
            "Failed to read {}: {e}",
            path.display()
        ))),
    }
}

async fn write_private(path: &Path, contents: &[u8]) -> Result<(), DomainError> {
    let to_error =
        |e: std::io::Error| DomainError::Certificate(format!("Failed to write {}: {e}", path.display()));

    tokio::fs::write(path, contents).await.map_err(to_error)?;
    restrict_permissions(path, 0o600).map_err(to_error)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
