//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `lifxctl.toml` in the working directory unless `--config` names
//! another file. Every field has a sensible default so the default file is
//! optional. Environment variables take precedence over file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use lifxctl_adapter_lifx_lan::LanConfig;
use lifxctl_app::retry::RetryPolicy;
use lifxctl_app::verified::VerificationPolicy;

/// Config file used when `--config` is not given.
pub const DEFAULT_PATH: &str = "lifxctl.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device registry file.
    pub registry: RegistryConfig,
    /// Retry and read-back verification settings.
    pub retry: RetryConfig,
    /// LAN transport settings.
    pub transport: LanConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path of the JSON registry file.
    pub path: PathBuf,
}

/// Retry budget and verification tolerance for bulb commands.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per command, including the first.
    pub max_attempts: u32,
    /// Backoff unit, in milliseconds.
    pub base_delay_ms: u64,
    /// Wait between a change and its read-back, in milliseconds.
    pub settle_delay_ms: u64,
    /// Accepted drift per color component on read-back.
    pub tolerance: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_PATH`] if present,
    /// then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed, if an explicitly named
    /// file cannot be read, or if a value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path, true)?,
            None => Self::from_file(Path::new(DEFAULT_PATH), false)?,
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("LIFXCTL_REGISTRY") {
            self.registry.path = PathBuf::from(val);
        }
        if let Some(val) = lookup("LIFXCTL_BROADCAST") {
            if let Ok(addr) = val.parse() {
                self.transport.broadcast = addr;
            }
        }
        if let Some(val) = lookup("LIFXCTL_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.transport.send_attempts == 0 {
            return Err(ConfigError::Validation(
                "transport.send_attempts must be at least 1".to_string(),
            ));
        }
        if self.transport.port == 0 {
            return Err(ConfigError::Validation(
                "transport.port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
        }
    }

    #[must_use]
    pub fn verification_policy(&self) -> VerificationPolicy {
        VerificationPolicy {
            settle_delay: Duration::from_millis(self.retry.settle_delay_ms),
            tolerance: self.retry.tolerance,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("lifx_config.json"),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            settle_delay_ms: 500,
            tolerance: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "lifxctl=info,lifxctl_app=info,lifxctl_adapter_lifx_lan=warn,lifxctl_adapter_storage_json=warn"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
