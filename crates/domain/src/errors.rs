use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Transport error talking to {upstream}: {reason}")]
    Transport { upstream: String, reason: String },

    #[error("Upstream {upstream} returned HTTP {status}")]
    UpstreamStatus { upstream: String, status: u16 },

    #[error("Upstream {upstream} returned content type '{content_type}'")]
    ContentType {
        upstream: String,
        content_type: String,
    },

    #[error("Failed to decode DNS message: {0}")]
    Decode(String),

    #[error("Failed to encode DNS message: {0}")]
    Encode(String),

    #[error("All upstream attempts failed ({attempts} primary + fallback), last error: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("Certificate error: {0}")]
    Certificate(String),

    #[error("Listener error on {listener}: {reason}")]
    Listener {
        listener: &'static str,
        reason: String,
    },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Invalid upstream URL '{url}': {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    pub fn listener(listener: &'static str, reason: impl ToString) -> Self {
        Self::Listener {
            listener,
            reason: reason.to_string(),
        }
    }
}
