//! abscan-backends - CAN transports over SocketCAN and vendor USB adapters
//!
//! Both backends implement [`CanTransport`], so callers choose one at
//! construction time and stay backend-agnostic afterwards:
//!
//! - [`SocketTransport`] captures on a background thread into a
//!   [`FrameQueue`](abscan_core::FrameQueue) and writes directly to the socket.
//! - [`VendorTransport`] has no thread; `poll_incoming` drains the driver's
//!   receive queue on the caller's thread.
//!
//! # Example
//!
//! ```ignore
//! use abscan_backends::{create_transport, config::TransportConfig};
//!
//! let config = TransportConfig::from_toml_str(r#"
//!     type = "socket"
//!     interface = "vcan0"
//! "#)?;
//! let mut transport = create_transport(&config)?;
//! transport.start()?;
//! let incoming = transport.poll_incoming();
//! ```

pub mod config;
pub mod socket;
pub mod vendor;

pub use config::{ConfigError, MockConfig, SocketConfig, TransportConfig, VendorConfig};
pub use socket::{CaptureStats, RawCanSocket, SocketTransport};
pub use vendor::{SimulatedDriver, VendorDriver, VendorTransport};

#[cfg(all(target_os = "linux", feature = "socketcan"))]
pub use socket::LinuxCanSocket;

// Re-export for convenience
pub use abscan_core::{
    BackendCode, CanTransport, ErrorKind, Frame, FrameError, Incoming, TransportError,
    TransportResult,
};

/// Create a transport based on configuration
pub fn create_transport(
    config: &TransportConfig,
) -> Result<Box<dyn CanTransport>, TransportError> {
    config.validate()?;
    match config {
        #[cfg(all(target_os = "linux", feature = "socketcan"))]
        TransportConfig::Socket(cfg) => {
            let transport = SocketTransport::open(cfg)?;
            Ok(Box::new(transport))
        }
        #[cfg(not(all(target_os = "linux", feature = "socketcan")))]
        TransportConfig::Socket(_) => Err(TransportError::Unsupported(
            "SocketCAN requires Linux and the 'socketcan' feature".to_string(),
        )),
        TransportConfig::Vendor(_) => Err(TransportError::Unsupported(
            "no native vendor driver is linked; use create_vendor_transport".to_string(),
        )),
        TransportConfig::Mock(cfg) => {
            let driver = SimulatedDriver::new().with_loopback(cfg.loopback);
            let transport = VendorTransport::new(driver, &cfg.vendor)?;
            Ok(Box::new(transport))
        }
    }
}

/// Create a vendor transport over a caller-supplied driver binding
pub fn create_vendor_transport<D>(
    driver: D,
    config: &VendorConfig,
) -> Result<Box<dyn CanTransport>, TransportError>
where
    D: VendorDriver + 'static,
{
    let transport = VendorTransport::new(driver, config)?;
    Ok(Box::new(transport))
}
