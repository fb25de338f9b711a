//! Transport configuration
//!
//! Configuration is read from TOML. The `type` key selects the backend:
//!
//! ```toml
//! type = "socket"
//! interface = "can0"
//! read_timeout_ms = 10
//! ```
//!
//! ```toml
//! type = "vendor"
//! channel = 0x51
//! bitrate = 500000
//! listen_only = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use abscan_core::TransportError;

use crate::vendor::{Channel, VendorBitrate};

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] TransportError),
}

/// Transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Raw SocketCAN socket (Linux only)
    Socket(SocketConfig),
    /// Vendor USB adapter driven through a native driver binding
    Vendor(VendorConfig),
    /// Vendor transport over the in-process simulated adapter
    Mock(MockConfig),
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Mock(MockConfig::default())
    }
}

impl TransportConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check values the backends cannot recover from at runtime
    pub fn validate(&self) -> Result<(), TransportError> {
        match self {
            TransportConfig::Socket(cfg) => cfg.validate(),
            TransportConfig::Vendor(cfg) => cfg.validate(),
            TransportConfig::Mock(cfg) => cfg.vendor.validate(),
        }
    }
}

/// SocketCAN configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketConfig {
    /// CAN interface name (e.g., "can0", "vcan0")
    pub interface: String,
    /// Upper bound on one capture-thread read, and so on `stop()` latency
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Start the capture thread as soon as the socket is open
    #[serde(default)]
    pub capture_on_open: bool,
}

fn default_read_timeout_ms() -> u64 {
    10
}

impl SocketConfig {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            read_timeout_ms: default_read_timeout_ms(),
            capture_on_open: false,
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        if self.interface.trim().is_empty() {
            return Err(TransportError::InvalidConfig(
                "CAN interface name is empty".to_string(),
            ));
        }
        // IFNAMSIZ includes the trailing NUL
        if self.interface.len() >= 16 {
            return Err(TransportError::InvalidConfig(format!(
                "CAN interface name '{}' is longer than 15 bytes",
                self.interface
            )));
        }
        if self.read_timeout_ms == 0 {
            return Err(TransportError::InvalidConfig(
                "read_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Vendor adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Driver channel handle (0x51 = first USB adapter)
    #[serde(default = "default_channel")]
    pub channel: u16,
    /// CAN bus bitrate in bit/s
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,
    /// Receive without transmitting or acknowledging
    #[serde(default)]
    pub listen_only: bool,
}

fn default_channel() -> u16 {
    Channel::USB_BUS_1.0
}

fn default_bitrate() -> u32 {
    250_000
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            bitrate: default_bitrate(),
            listen_only: false,
        }
    }
}

impl VendorConfig {
    pub fn channel(&self) -> Channel {
        Channel(self.channel)
    }

    pub fn vendor_bitrate(&self) -> Result<VendorBitrate, TransportError> {
        VendorBitrate::from_bps(self.bitrate).ok_or_else(|| {
            TransportError::InvalidConfig(format!(
                "Bitrate {} bit/s is not supported by the adapter",
                self.bitrate
            ))
        })
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        self.vendor_bitrate().map(|_| ())
    }
}

/// Simulated adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockConfig {
    #[serde(flatten)]
    pub vendor: VendorConfig,
    /// Echo transmitted frames back into the receive queue
    #[serde(default = "default_true")]
    pub loopback: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            vendor: VendorConfig::default(),
            loopback: default_true(),
        }
    }
}
