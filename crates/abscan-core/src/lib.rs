//! abscan-core - Core types and traits for abscan CAN transports
//!
//! This crate provides the backend-agnostic pieces shared by every CAN
//! transport: the [`Frame`] value type, its 16-byte raw-socket wire record,
//! the internally synchronized [`FrameQueue`], and the [`CanTransport`]
//! capability trait implemented by the backends in `abscan-backends`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 CanTransport                  │
//! │  send / poll_incoming / start / stop / flags  │
//! └───────────────┬───────────────────┬───────────┘
//!                 │                   │
//!      ┌──────────┴─────────┐ ┌───────┴──────────┐
//!      │  SocketTransport   │ │ VendorTransport  │
//!      │ capture thread ──► │ │ synchronous      │
//!      │   FrameQueue       │ │ driver drain     │
//!      └────────────────────┘ └──────────────────┘
//! ```

pub mod error;
pub mod frame;
pub mod queue;
pub mod transport;
pub mod wire;

pub use error::{BackendCode, ErrorKind, TransportError, TransportResult};
pub use frame::{Frame, FrameError, EXTENDED_FLAG, EXTENDED_MASK, MAX_DATA_LEN, STANDARD_MASK};
pub use queue::FrameQueue;
pub use transport::{CanTransport, Incoming};
pub use wire::CAN_FRAME_SIZE;
