use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Service domain without wildcards. Certificates are issued for the
    /// domain and its wildcard, and DoT clients must use a server name ending
    /// with it.
    #[serde(default)]
    pub domain: String,

    #[serde(default = "default_cert_dir")]
    pub cert_dir: String,

    /// Preferred certificate chain handed to the ACME issuer
    #[serde(default = "default_preferred_chain")]
    pub preferred_chain: String,

    /// ACME registration email
    #[serde(default)]
    pub email: String,

    /// ACME DNS-01 challenge provider identifier
    #[serde(default)]
    pub dns_provider: String,

    /// Renew the certificate when it expires within this many days
    #[serde(default = "default_renew_threshold_days")]
    pub renew_threshold_days: u32,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            cert_dir: default_cert_dir(),
            preferred_chain: default_preferred_chain(),
            email: String::new(),
            dns_provider: String::new(),
            renew_threshold_days: default_renew_threshold_days(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_cert_dir() -> String {
    "./certs".to_string()
}

fn default_preferred_chain() -> String {
    "ISRG Root X1".to_string()
}

fn default_renew_threshold_days() -> u32 {
    7
}

fn default_refresh_interval_secs() -> u64 {
    24 * 60 * 60
}
