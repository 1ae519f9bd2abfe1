//! # Observability
//!
//! Initializes tracing for the server. Log records emitted by the
//! `format-string` library through the `log` facade are forwarded into the
//! same subscriber.

use anyhow::Context;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Configuration for initializing the observability system.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// The maximum level captured for this workspace's crates.
    pub level: Level,
    /// The target for the logs.
    pub target: LogTarget,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            target: LogTarget::default(),
        }
    }
}

/// Defines the output target for logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogTarget {
    /// Log to the console (stdout).
    #[default]
    Console,
    /// Log to a file.
    File(String),
}

/// Builds the filter: `RUST_LOG` directives, plus `level` for this workspace's crates.
pub fn env_filter(level: Level) -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive(format!("format_string={}", level).parse()?)
        .add_directive(format!("format_string_server={}", level).parse()?))
}

/// Initializes the global tracing subscriber and the `log` bridge.
///
/// Call once at the start of `main`; a second call returns an error.
pub fn init(config: ObservabilityConfig) -> anyhow::Result<()> {
    let filter = env_filter(config.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.target {
        LogTarget::Console => {
            let layer = fmt::layer().with_writer(std::io::stdout);
            tracing::subscriber::set_global_default(registry.with(layer))
                .context("a global tracing subscriber is already set")?;
        }
        LogTarget::File(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("failed to create log file {path}"))?;
            let layer = fmt::layer().with_writer(file).with_ansi(false);
            tracing::subscriber::set_global_default(registry.with(layer))
                .context("a global tracing subscriber is already set")?;
        }
    };

    tracing_log::LogTracer::init().context("a global logger is already set")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.target, LogTarget::Console);
    }

    #[test]
    fn test_env_filter_accepts_levels() {
        for level in [Level::TRACE, Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR] {
            assert!(env_filter(level).is_ok());
        }
    }
}
