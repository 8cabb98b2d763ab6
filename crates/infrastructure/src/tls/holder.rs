use super::certificate::TlsCertificate;
use super::manager::CertificateManager;
use arc_swap::ArcSwap;
use ferrous_doh_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Source of the certificate presented during a TLS handshake.
pub trait CertificateHolder: Send + Sync {
    /// Current certificate. Never blocks and never fails.
    fn get_certificate(&self) -> Arc<TlsCertificate>;
}

/// Holds the current certificate and periodically asks the manager for a
/// fresh one.
///
/// A failed refresh keeps the previous certificate. Readers always get a
/// whole certificate; replacement is a single pointer swap.
pub struct RefreshingCertificateHolder {
    manager: Arc<dyn CertificateManager>,
    current: ArcSwap<TlsCertificate>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl RefreshingCertificateHolder {
    /// Performs the initial retrieval. Its failure is returned to the caller;
    /// there is no certificate to fall back on yet.
    pub async fn new(manager: Arc<dyn CertificateManager>) -> Result<Self, DomainError> {
        let initial = manager.retrieve_certificate().await?;
        info!(names = ?initial.dns_names(), "Initial certificate loaded");

        Ok(Self {
            manager,
            current: ArcSwap::new(initial),
            interval: DEFAULT_REFRESH_INTERVAL,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// One refresh round. On success the new certificate is installed.
    pub async fn refresh(&self) -> Result<(), DomainError> {
        let cert = self.manager.retrieve_certificate().await?;
        self.current.store(cert);
        Ok(())
    }

    /// Spawns the refresh loop. The first refresh happens one interval after
    /// the start; the loop ends when the cancellation token fires.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting certificate refresh job"
        );

        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("Certificate refresh job: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.refresh().await {
                            Ok(()) => info!(
                                names = ?self.current.load().dns_names(),
                                "Certificate refreshed"
                            ),
                            Err(e) => error!(
                                error = %e,
                                "Certificate refresh failed, keeping the current certificate"
                            ),
                        }
                    }
                }
            }
        })
    }
}

impl CertificateHolder for RefreshingCertificateHolder {
    fn get_certificate(&self) -> Arc<TlsCertificate> {
        self.current.load_full()
    }
}
