use ferrous_doh_application::ports::DohDispatcher;
use ferrous_doh_application::use_cases::{HandleDnsQueryUseCase, ResolveQueryUseCase};
use ferrous_doh_domain::Config;
use ferrous_doh_infrastructure::doh::DohClient;
use ferrous_doh_infrastructure::server::DnsRequestHandler;
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub handler: Arc<DnsRequestHandler>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let timeout = config.upstream_timeout();

        let primary: Arc<dyn DohDispatcher> =
            Arc::new(DohClient::from_urls(&config.upstream.servers, timeout)?);
        let fallback: Arc<dyn DohDispatcher> = Arc::new(DohClient::from_urls(
            [config.upstream.fallback.as_str()],
            timeout,
        )?);

        let resolver = Arc::new(ResolveQueryUseCase::new(
            primary,
            fallback,
            config.effective_retry_attempts(),
        ));
        let use_case = Arc::new(HandleDnsQueryUseCase::new(Arc::clone(&resolver)));
        let handler = Arc::new(DnsRequestHandler::new(use_case, &config.tls.domain));

        info!(
            upstreams = config.upstream.servers.len(),
            retry_attempts = resolver.retry_attempts(),
            "DNS services initialized"
        );

        Ok(Self { handler })
    }
}
