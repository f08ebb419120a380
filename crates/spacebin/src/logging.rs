//! Structured logging setup.
//!
//! Logs go to stderr so stdout stays reserved for the resolved configuration.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    /// Filter directive (e.g. "info", "spacebin_config=debug").
    /// `None` falls back to `RUST_LOG`, then "info".
    pub level: Option<String>,

    /// Whether to output JSON format.
    pub json_format: bool,
}

impl LogConfig {
    /// Resolve the filter from the explicit level, `RUST_LOG`, or "info".
    pub fn filter(&self) -> Result<EnvFilter> {
        match &self.level {
            Some(level) => {
                EnvFilter::try_new(level).with_context(|| format!("invalid log level: {level}"))
            }
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
        }
    }
}

/// Initializes the global subscriber.
///
/// # Errors
///
/// Fails on an invalid filter or when a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = config.filter()?;

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .context("failed to install log subscriber")?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .context("failed to install log subscriber")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level() {
        let config = LogConfig {
            level: Some("spacebin_config=debug,warn".to_string()),
            json_format: true,
        };
        assert!(config.filter().is_ok());
    }

    #[test]
    fn test_invalid_level() {
        let config = LogConfig {
            level: Some("spacebin=loud".to_string()),
            ..Default::default()
        };
        assert!(config.filter().is_err());
    }

    #[test]
    fn test_default() {
        let config = LogConfig::default();
        assert!(!config.json_format);
        assert!(config.filter().is_ok());
    }
}
