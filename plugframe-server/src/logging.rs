//! Process-wide `tracing` setup for plugin binaries.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive that overrides
/// [`ServerConfig::log_level`].
pub const LOG_ENV: &str = "PLUGFRAME_LOG";

/// Installs a global fmt subscriber writing to stderr. Stdout belongs to the
/// plugin handshake, so nothing is ever logged there.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_logging(config: &ServerConfig) -> ServerResult<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.is_empty() => EnvFilter::try_new(directive),
        _ => EnvFilter::try_new(&config.log_level),
    }
    .map_err(|e| ServerError::LogFilter(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| ServerError::LoggingInit(e.to_string()))
}
