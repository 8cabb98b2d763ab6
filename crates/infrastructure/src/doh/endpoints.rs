use ferrous_doh_domain::config::{parse_upstream_url, CLIENT_ID_PLACEHOLDER};
use ferrous_doh_domain::DomainError;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Equally weighted DoH endpoints, handed out in round-robin order.
///
/// The URL templates are fixed at construction; only the cursor moves.
#[derive(Debug)]
pub struct UpstreamEndpoints {
    templates: Vec<String>,
    counter: AtomicUsize,
}

impl UpstreamEndpoints {
    /// Validates every URL (scheme and host required). An empty list is
    /// rejected.
    pub fn new<I, S>(urls: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let templates = urls
            .into_iter()
            .map(|raw| {
                parse_upstream_url(raw.as_ref())?;
                Ok(raw.as_ref().trim().to_string())
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        if templates.is_empty() {
            return Err(DomainError::ConfigError(
                "No upstream DoH servers configured".into(),
            ));
        }

        Ok(Self {
            templates,
            counter: AtomicUsize::new(0),
        })
    }

    /// Next endpoint template. Every call advances the shared cursor once.
    pub fn next(&self) -> &str {
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % self.templates.len();
        &self.templates[index]
    }

    pub fn urls(&self) -> &[String] {
        &self.templates
    }
}

/// Substitutes the client identifier into an endpoint template.
pub fn render_upstream_url(template: &str, client_id: &str) -> String {
    template.replace(CLIENT_ID_PLACEHOLDER, client_id)
}
