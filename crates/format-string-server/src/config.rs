//! Server configuration read from the environment.

use crate::observability::{LogTarget, ObservabilityConfig};
use anyhow::Context;
use std::env;
use std::net::SocketAddr;
use tracing::Level;

/// Environment variable holding the address to listen on.
pub const ADDR_ENV: &str = "FORMAT_STRING_ADDR";

/// Environment variable holding the log level (`trace`, `debug`, `info`, `warn`, `error`).
pub const LOG_LEVEL_ENV: &str = "FORMAT_STRING_LOG";

/// Environment variable holding an optional log file path. Logs go to stdout when unset.
pub const LOG_FILE_ENV: &str = "FORMAT_STRING_LOG_FILE";

pub const DEFAULT_ADDR: &str = "127.0.0.1:8188";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// **Default:** `127.0.0.1:8188`
    pub bind_addr: SocketAddr,
    /// **Default:** `INFO`
    pub log_level: Level,
    pub log_target: LogTarget,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8188)),
            log_level: Level::INFO,
            log_target: LogTarget::Console,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset or empty keys use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get(ADDR_ENV) {
            config.bind_addr = addr
                .trim()
                .parse()
                .with_context(|| format!("invalid {ADDR_ENV} '{addr}'"))?;
        }
        if let Some(level) = get(LOG_LEVEL_ENV) {
            config.log_level = level
                .trim()
                .parse()
                .with_context(|| format!("invalid {LOG_LEVEL_ENV} '{level}'"))?;
        }
        if let Some(path) = get(LOG_FILE_ENV) {
            config.log_target = LogTarget::File(path);
        }

        Ok(config)
    }

    pub fn observability(&self) -> ObservabilityConfig {
        ObservabilityConfig {
            level: self.log_level,
            target: self.log_target.clone(),
        }
    }
}
