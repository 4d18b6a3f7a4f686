//! Configuration for irlink
//!
//! Session construction parameters with sensible defaults.

use std::time::Duration;

use crate::error::{LinkError, Result};

/// Configuration for one controller session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Transport identifier (e.g. "/dev/ttyUSB0", "COM1")
    pub port: String,

    /// Serial baud rate
    pub baud_rate: u32,

    /// How long a read waits before returning short
    pub timeout: Duration,

    /// How long a write may block
    pub write_timeout: Duration,

    // -------------------------------------------------------------------------
    // Session Configuration
    // -------------------------------------------------------------------------
    /// Escalate the first NAC of any message into a transport failure
    pub fail_fast: bool,

    /// Session identity used in logs. `None` picks the next `RC{n}` name.
    pub name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(1),
            fail_fast: true,
            name: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject configurations no transport could open
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(LinkError::Config("port must not be empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(LinkError::Config("baud rate must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the transport identifier
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.config.port = port.into();
        self
    }

    /// Set the baud rate
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.config.baud_rate = baud_rate;
        self
    }

    /// Set the read timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    /// Set the session-wide fail-fast policy
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    /// Set an explicit session name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
