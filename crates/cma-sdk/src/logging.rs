use std::str::FromStr;

use tracing::Level;

use crate::config::LogConfig;
use crate::error::{SdkError, SdkResult};

/// Parse a configured level name.
pub fn parse_level(level: &str) -> SdkResult<Level> {
    Level::from_str(level.trim()).map_err(|_| SdkError::Config(format!("unknown log level `{level}`")))
}

/// Install a global `fmt` subscriber at the configured level.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> SdkResult<()> {
    let level = parse_level(&config.level)?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| SdkError::Logging(e.to_string()))
}
