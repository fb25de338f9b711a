//! Transport layer errors

use std::fmt;
use std::io;

use thiserror::Error;

use crate::frame::FrameError;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Raw code reported by a backend, kept opaque for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCode {
    /// `errno` from a socket system call
    Errno(i32),
    /// Status word returned by a vendor driver
    Vendor(u32),
    /// Short write: bytes actually written to the socket
    ShortWrite(usize),
}

impl BackendCode {
    /// Capture the `errno` of an I/O error, if it carries one.
    pub fn from_io(err: &io::Error) -> Self {
        Self::Errno(err.raw_os_error().unwrap_or(0))
    }
}

impl fmt::Display for BackendCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendCode::Errno(errno) => {
                write!(f, "errno {} ({})", errno, io::Error::from_raw_os_error(*errno))
            }
            BackendCode::Vendor(status) => write!(f, "vendor status 0x{:05X}", status),
            BackendCode::ShortWrite(n) => write!(f, "short write of {} bytes", n),
        }
    }
}

/// Classification of a [`TransportError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Initialization,
    Transmit,
    Receive,
    NotActive,
    InvalidFrame,
    InvalidConfig,
    Unsupported,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Backend handle creation, binding, or channel initialization failed
    #[error("Initialization failed: {message}")]
    Initialization {
        message: String,
        code: Option<BackendCode>,
    },

    #[error("Transmit failed: {0}")]
    Transmit(BackendCode),

    #[error("Receive failed: {0}")]
    Receive(BackendCode),

    #[error("Transport is not active")]
    NotActive,

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transport not supported: {0}")]
    Unsupported(String),
}

impl TransportError {
    pub fn initialization(message: impl Into<String>, code: Option<BackendCode>) -> Self {
        Self::Initialization {
            message: message.into(),
            code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Initialization { .. } => ErrorKind::Initialization,
            TransportError::Transmit(_) => ErrorKind::Transmit,
            TransportError::Receive(_) => ErrorKind::Receive,
            TransportError::NotActive => ErrorKind::NotActive,
            TransportError::InvalidFrame(_) => ErrorKind::InvalidFrame,
            TransportError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            TransportError::Unsupported(_) => ErrorKind::Unsupported,
        }
    }

    /// Raw backend code, when the backend reported one
    pub fn code(&self) -> Option<BackendCode> {
        match self {
            TransportError::Initialization { code, .. } => *code,
            TransportError::Transmit(code) | TransportError::Receive(code) => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_code() {
        let err = TransportError::Transmit(BackendCode::Vendor(0x1));
        assert_eq!(err.kind(), ErrorKind::Transmit);
        assert_eq!(err.code(), Some(BackendCode::Vendor(0x1)));

        let err = TransportError::initialization("bind failed", Some(BackendCode::Errno(19)));
        assert_eq!(err.kind(), ErrorKind::Initialization);
        assert_eq!(err.code(), Some(BackendCode::Errno(19)));

        assert_eq!(TransportError::NotActive.code(), None);
    }

    #[test]
    fn test_backend_code_from_io() {
        let io_err = io::Error::from_raw_os_error(105);
        assert_eq!(BackendCode::from_io(&io_err), BackendCode::Errno(105));
    }

    #[test]
    fn test_display_vendor_code() {
        let err = TransportError::Receive(BackendCode::Vendor(0x40));
        assert_eq!(err.to_string(), "Receive failed: vendor status 0x00040");
    }
}
