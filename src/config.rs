//! Server Configuration
//!
//! Everything the bootstrap needs to know before it binds a socket.

use crate::{DEFAULT_HOST, DEFAULT_PORT};
use thiserror::Error;

/// Default cap on bytes buffered per connection (64 MB)
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Smallest accepted per-connection buffer cap (1 KB)
pub const MIN_MAX_BUFFER_SIZE: usize = 1024;

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port must be non-zero")]
    InvalidPort,

    #[error("worker count must be at least 1")]
    InvalidWorkers,

    #[error("max buffer size must be at least {min} bytes, got {got}")]
    BufferTooSmall { got: usize, min: usize },
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Runtime worker threads
    pub workers: usize,

    /// Bytes a single connection may buffer before it is dropped
    pub max_buffer_size: usize,

    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks the values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if self.max_buffer_size < MIN_MAX_BUFFER_SIZE {
            return Err(ConfigError::BufferTooSmall {
                got: self.max_buffer_size,
                min: MIN_MAX_BUFFER_SIZE,
            });
        }
        Ok(())
    }
}

/// Builder for ServerConfig
#[derive(Default)]
pub struct ConfigBuilder {
    config: ServerConfig,
}

impl ConfigBuilder {
    /// Set the bind host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the listen port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the number of runtime worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the per-connection buffer cap (in bytes)
    pub fn max_buffer_size(mut self, bytes: usize) -> Self {
        self.config.max_buffer_size = bytes;
        self
    }

    /// Set the fallback log filter
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Validates and returns the config.
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:6379");
        assert!(config.workers >= 1);
        assert_eq!(config.max_buffer_size, DEFAULT_MAX_BUFFER_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::builder()
            .host("0.0.0.0")
            .port(7000)
            .workers(2)
            .max_buffer_size(4096)
            .log_level("debug")
            .build()
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:7000");
        assert_eq!(config.workers, 2);
        assert_eq!(config.max_buffer_size, 4096);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            ServerConfig::builder().port(0).build(),
            Err(ConfigError::InvalidPort)
        );
        assert_eq!(
            ServerConfig::builder().workers(0).build(),
            Err(ConfigError::InvalidWorkers)
        );
        assert_eq!(
            ServerConfig::builder().max_buffer_size(10).build(),
            Err(ConfigError::BufferTooSmall { got: 10, min: 1024 })
        );
    }
}
