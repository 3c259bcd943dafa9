//! Configuration for jsondb
//!
//! Centralized configuration with sensible defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DbError, Result};

/// Port the server listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 34567;

/// Main configuration for a jsondb server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// The single file holding the whole document tree.
    /// Created (along with its parent directory) on the first successful write.
    pub db_path: PathBuf,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Pending-connection backlog handed to listen(2)
    pub backlog: i32,

    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Worker Pool Configuration
    // -------------------------------------------------------------------------
    /// Number of worker threads running connection handlers
    pub worker_threads: usize,

    /// How long shutdown waits for in-flight handlers, before and after
    /// force-cancelling them (milliseconds)
    pub shutdown_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/db.json"),
            listen_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            backlog: 50,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            worker_threads: 10,
            shutdown_timeout_ms: 60_000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration for values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(DbError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.backlog <= 0 {
            return Err(DbError::Config(format!(
                "backlog must be positive, got {}",
                self.backlog
            )));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(DbError::Config("db_path must not be empty".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Parse the listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| {
            DbError::Config(format!("invalid listen address '{}': {}", self.listen_addr, e))
        })
    }

    /// Shutdown wait budget as a Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database file path
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the listen backlog
    pub fn backlog(mut self, backlog: i32) -> Self {
        self.config.backlog = backlog;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the shutdown wait budget (in milliseconds)
    pub fn shutdown_timeout_ms(mut self, ms: u64) -> Self {
        self.config.shutdown_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
