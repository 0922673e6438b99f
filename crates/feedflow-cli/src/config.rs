//! CLI configuration.
//!
//! Settings load from a TOML file (`--config`, or
//! `<config dir>/feedflow/config.toml` by default) and are overridden by
//! command-line flags. A missing default file just means defaults.
//!
//! ```toml
//! [device]
//! address = "192.168.4.1:3333"
//!
//! [retry]
//! max_retries = 3
//! delay_ms = 1000
//!
//! [thresholds]
//! temp_optimal_min = 26.0
//! temp_optimal_max = 30.0
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use feedflow_link::{RetryConfig, ThresholdConfig, Thresholds};

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target feeder.
    pub device: DeviceConfig,
    /// Connection retry settings.
    pub retry: RetrySettings,
    /// Gauge banding overrides.
    pub thresholds: ThresholdConfig,
}

/// Feeder identity settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Peer address understood by the transport, e.g. `192.168.4.1:3333`.
    pub address: Option<String>,
}

/// Retry settings in config-file-friendly units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay between attempts, in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicitly passed path must exist; the default location is
    /// optional and silently falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw)
                .with_context(|| format!("failed to parse config at {}", path.display())),
            Err(_) if !required => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read config at {}", path.display())),
        }
    }

    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("feedflow").join("config.toml"))
    }

    /// Pick the feeder address: flag first, then config file.
    pub fn resolve_address(&self, flag: Option<String>) -> Result<String> {
        if let Some(address) = flag {
            return Ok(address);
        }
        match &self.device.address {
            Some(address) => Ok(address.clone()),
            None => bail!("no feeder address: pass --address or set [device].address in the config"),
        }
    }

    /// The retry profile for the link.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.retry.max_retries)
            .initial_delay(Duration::from_millis(self.retry.delay_ms))
    }

    /// The threshold evaluator for display.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.thresholds.clone())
    }
}
