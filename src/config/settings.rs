//! Configuration settings for the runlink client.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::client::RetryPolicy;
use crate::error::ClientError;
use crate::protocol::DEFAULT_MAX_FRAME_SIZE;

/// Main configuration structure for the client.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Hostname of the run-tracking daemon.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port of the daemon.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_ms: u64,
    /// Per-attempt read timeout in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_ms: u64,
}

/// Retry configuration for the receive loop.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Fixed backoff between read attempts, in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Maximum read attempts before giving up.
    ///
    /// `None` retries indefinitely on pure read timeouts; cancellation
    /// still applies. Only reachable programmatically, a config file
    /// always carries a bound.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: Option<u32>,
}

/// Limits configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum response frame size in bytes.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1337
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_read_timeout_ms() -> u64 {
    1000
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_max_attempts() -> Option<u32> {
    Some(30)
}

fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout_ms(),
            read_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_ms: default_backoff_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_frame_size: default_max_frame_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            timeouts: TimeoutConfig::default(),
            retry: RetryConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ClientError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| ClientError::Config {
            message: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ClientError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ClientError::Config {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(ClientError::Config {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        if self.server.port == 0 {
            return Err(ClientError::Config {
                message: "Server port must be non-zero".to_string(),
            });
        }

        if self.timeouts.read_ms == 0 {
            return Err(ClientError::Config {
                message: "Read timeout must be non-zero".to_string(),
            });
        }

        if self.retry.max_attempts == Some(0) {
            return Err(ClientError::Config {
                message: "Retry max_attempts must be non-zero when set".to_string(),
            });
        }

        Ok(())
    }

    /// Connect timeout as a duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.connect_ms)
    }

    /// Retry policy for the receive loop.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            read_timeout: Duration::from_millis(self.timeouts.read_ms),
            backoff: Duration::from_millis(self.retry.backoff_ms),
            max_attempts: self.retry.max_attempts,
        }
    }
}
