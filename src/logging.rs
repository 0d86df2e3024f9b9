//! Diagnostic logging setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{VaultError, VaultResult};

/// Environment variable holding the log filter, e.g. `debug` or `vaultkeeper=trace`
pub const LOG_ENV: &str = "VAULTKEEPER_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, writing to stderr
///
/// Stdout stays reserved for command output.
pub fn init() -> VaultResult<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| VaultError::Config(format!("Failed to install logger: {}", e)))
}
