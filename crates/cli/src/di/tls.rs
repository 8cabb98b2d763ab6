use ferrous_doh_domain::Config;
use ferrous_doh_infrastructure::tls::{
    CertificateHolder, FileCertificateRepository, LocalCertificateManager,
    RefreshingCertificateHolder, SelfSignedIssuer,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

const SECONDS_PER_DAY: u64 = 86_400;

pub struct CertificateServices {
    pub holder: Arc<RefreshingCertificateHolder>,
}

impl CertificateServices {
    /// Loads or issues the initial certificate and starts the refresh job.
    pub async fn start(config: &Config, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let repository = Arc::new(FileCertificateRepository::new(&config.tls.cert_dir)?);
        let repository_dir = repository.dir().to_path_buf();
        let manager = Arc::new(LocalCertificateManager::new(
            repository,
            Arc::new(SelfSignedIssuer),
            config.tls.domain.clone(),
            Duration::from_secs(u64::from(config.tls.renew_threshold_days) * SECONDS_PER_DAY),
        ));

        let holder = Arc::new(
            RefreshingCertificateHolder::new(manager)
                .await?
                .with_interval(Duration::from_secs(config.tls.refresh_interval_secs))
                .with_cancellation(shutdown),
        );
        Arc::clone(&holder).start();

        info!(
            domain = %config.tls.domain,
            names = ?holder.get_certificate().dns_names(),
            cert_dir = %repository_dir.display(),
            "Certificate services initialized"
        );

        Ok(Self { holder })
    }
}
