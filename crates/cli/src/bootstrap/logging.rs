use ferrous_doh_domain::Config;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. An unknown level falls back to `info`.
pub fn init_logging(config: &Config) {
    let requested = config.logging.level.trim();
    let (level, invalid) = match requested.parse::<LevelFilter>() {
        Ok(level) => (level, false),
        Err(_) => (LevelFilter::INFO, true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.to_string()))
        .with_target(false)
        .init();

    if invalid {
        error!(level = %requested, "Invalid log level, using info");
    }
}
