//! Configuration types for kiqforge.
//!
//! This module contains the connector settings used to reach the Redis store
//! shared with the Sidekiq workers, and the logging settings used by the
//! client process.

use crate::error::{KiqError, KiqResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for kiqforge.
///
/// # Examples
///
/// ```rust
/// use kiqforge::config::{KiqConfig, RedisConfig};
///
/// // Use default configuration
/// let config = KiqConfig::default();
///
/// // Custom configuration
/// let config = KiqConfig {
///     redis: RedisConfig {
///         namespace: Some("myapp".to_string()),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KiqConfig {
    /// Store connection configuration
    pub redis: RedisConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Redis connector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection string (e.g., "redis://localhost:6379/0")
    pub connection_string: String,

    /// Optional key namespace, prepended as `<namespace>:` to every key
    pub namespace: Option<String>,

    /// Time allowed for establishing the connection (in seconds)
    pub connect_timeout_secs: u64,

    /// Time allowed for a single store operation (in seconds)
    pub operation_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            connection_string: "redis://localhost:6379/0".to_string(),
            namespace: None,
            connect_timeout_secs: 10,
            operation_timeout_secs: 5,
        }
    }
}

impl RedisConfig {
    /// Create a configuration for the given connection string.
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            ..Default::default()
        }
    }

    /// Set the key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the per-operation timeout.
    pub fn with_operation_timeout(mut self, timeout_secs: u64) -> Self {
        self.operation_timeout_secs = timeout_secs;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout_secs: u64) -> Self {
        self.connect_timeout_secs = timeout_secs;
        self
    }

    /// Per-operation timeout as a [`Duration`].
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout_secs.secs()
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout_secs.secs()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: LogLevel,

    /// Enable colored output
    pub colored: bool,

    /// Include target module in logs
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            colored: true,
            include_targets: false,
        }
    }
}

impl LoggingConfig {
    /// Install a global `tracing` fmt subscriber built from this configuration.
    ///
    /// Fails with a configuration error if a global subscriber is already set.
    pub fn init(&self) -> KiqResult<()> {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::from(self.level))
            .with_ansi(self.colored)
            .with_target(self.include_targets)
            .try_init()
            .map_err(|e| KiqError::config(format!("Failed to install tracing subscriber: {}", e)))
    }
}

/// Log level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Helper trait for building delays and timeouts.
pub trait DurationExt {
    /// Convert seconds to Duration
    fn secs(self) -> Duration;
    /// Convert milliseconds to Duration
    fn millis(self) -> Duration;
    /// Convert minutes to Duration
    fn minutes(self) -> Duration;
}

impl DurationExt for u64 {
    fn secs(self) -> Duration {
        Duration::from_secs(self)
    }

    fn millis(self) -> Duration {
        Duration::from_millis(self)
    }

    fn minutes(self) -> Duration {
        Duration::from_secs(self.saturating_mul(60))
    }
}

impl KiqConfig {
    /// Create a new configuration for local development.
    pub fn development() -> Self {
        Self {
            redis: RedisConfig::default(),
            logging: LoggingConfig {
                level: LogLevel::Debug,
                colored: true,
                include_targets: true,
            },
        }
    }

    /// Create a new configuration for production deployments.
    pub fn production() -> Self {
        Self {
            redis: RedisConfig {
                connect_timeout_secs: 5,
                operation_timeout_secs: 2,
                ..Default::default()
            },
            logging: LoggingConfig {
                level: LogLevel::Info,
                colored: false,
                include_targets: false,
            },
        }
    }

    /// Create a configuration for testing.
    pub fn testing() -> Self {
        Self {
            redis: RedisConfig {
                connection_string: "redis://localhost:6379/15".to_string(),
                namespace: Some("test".to_string()),
                connect_timeout_secs: 1,
                operation_timeout_secs: 1,
            },
            logging: LoggingConfig {
                level: LogLevel::Debug,
                colored: false,
                include_targets: true,
            },
        }
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.redis.connection_string.trim().is_empty() {
            errors.push("Redis connection string must not be empty".to_string());
        }

        if self.redis.connect_timeout_secs == 0 {
            errors.push("Connect timeout must be greater than 0".to_string());
        }

        if self.redis.operation_timeout_secs == 0 {
            errors.push("Operation timeout must be greater than 0".to_string());
        }

        if let Some(namespace) = &self.redis.namespace {
            if namespace.is_empty() {
                errors.push("Namespace must not be empty when set".to_string());
            } else if namespace.ends_with(':') {
                errors.push("Namespace must not end with ':'".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
