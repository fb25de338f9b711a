//! Raw SocketCAN transport
//!
//! Frames are captured by a background thread into a [`FrameQueue`] and
//! handed out by `poll_incoming`; `send` writes straight to the socket.
//!
//! [`FrameQueue`]: abscan_core::FrameQueue

pub mod mock;
mod transport;

#[cfg(all(target_os = "linux", feature = "socketcan"))]
mod linux;

pub use transport::{CaptureStats, RawCanSocket, SocketTransport};

#[cfg(all(target_os = "linux", feature = "socketcan"))]
pub use linux::LinuxCanSocket;
