//! Classic CAN frame value type

use std::fmt;

use thiserror::Error;

/// Out-of-band flag in bit 31 of the raw id marking a 29-bit identifier
pub const EXTENDED_FLAG: u32 = 0x8000_0000;

/// Valid bits of an 11-bit standard identifier
pub const STANDARD_MASK: u32 = 0x0000_07FF;

/// Valid bits of a 29-bit extended identifier
pub const EXTENDED_MASK: u32 = 0x1FFF_FFFF;

/// Maximum payload of a classic CAN frame
pub const MAX_DATA_LEN: usize = 8;

/// Errors raised while building a [`Frame`]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("payload of {0} bytes exceeds the 8-byte CAN limit")]
    TooMuchData(usize),

    #[error("standard identifier 0x{0:X} does not fit in 11 bits")]
    StandardIdOutOfRange(u32),

    #[error("extended identifier 0x{0:X} does not fit in 29 bits")]
    ExtendedIdOutOfRange(u32),
}

/// A classic CAN frame: identifier, up to 8 data bytes and their count.
///
/// The identifier is kept in the SocketCAN convention: bit 31 set means the
/// remaining bits hold a 29-bit extended id, clear means an 11-bit standard
/// id. Only the first [`len`](Frame::len) bytes of the data buffer are
/// meaningful; equality ignores the rest.
#[derive(Clone, Copy)]
pub struct Frame {
    raw_id: u32,
    len: u8,
    data: [u8; MAX_DATA_LEN],
}

impl Frame {
    /// Build a frame from a raw id (extended flag in bit 31) and payload.
    pub fn new(raw_id: u32, data: &[u8]) -> Result<Self, FrameError> {
        if raw_id & EXTENDED_FLAG != 0 {
            Self::extended(raw_id & !EXTENDED_FLAG, data)
        } else {
            Self::standard(raw_id, data)
        }
    }

    /// Build a frame with an 11-bit identifier.
    pub fn standard(id: u32, data: &[u8]) -> Result<Self, FrameError> {
        if id & !STANDARD_MASK != 0 {
            return Err(FrameError::StandardIdOutOfRange(id));
        }
        Self::from_parts(id, data)
    }

    /// Build a frame with a 29-bit identifier.
    pub fn extended(id: u32, data: &[u8]) -> Result<Self, FrameError> {
        if id & !EXTENDED_MASK != 0 {
            return Err(FrameError::ExtendedIdOutOfRange(id));
        }
        Self::from_parts(id | EXTENDED_FLAG, data)
    }

    fn from_parts(raw_id: u32, data: &[u8]) -> Result<Self, FrameError> {
        if data.len() > MAX_DATA_LEN {
            return Err(FrameError::TooMuchData(data.len()));
        }
        let mut buf = [0u8; MAX_DATA_LEN];
        buf[..data.len()].copy_from_slice(data);
        Ok(Self {
            raw_id,
            len: data.len() as u8,
            data: buf,
        })
    }

    /// Identifier including the extended flag in bit 31
    pub fn raw_id(&self) -> u32 {
        self.raw_id
    }

    /// Identifier with the extended flag stripped
    pub fn id(&self) -> u32 {
        if self.is_extended() {
            self.raw_id & EXTENDED_MASK
        } else {
            self.raw_id & STANDARD_MASK
        }
    }

    pub fn is_extended(&self) -> bool {
        self.raw_id & EXTENDED_FLAG != 0
    }

    /// Valid payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Data length code (0-8)
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.raw_id == other.raw_id && self.data() == other.data()
    }
}

impl Eq for Frame {}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("id", &format_args!("0x{:X}", self.id()))
            .field("extended", &self.is_extended())
            .field("data", &self.data())
            .finish()
    }
}

/// `candump` notation: `123#0102`, `18DAF110#` for extended ids.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_extended() {
            write!(f, "{:08X}#", self.id())?;
        } else {
            write!(f, "{:03X}#", self.id())?;
        }
        for byte in self.data() {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_frame_accessors() {
        let frame = Frame::standard(0x123, &[0xDE, 0xAD]).unwrap();
        assert_eq!(frame.raw_id(), 0x123);
        assert_eq!(frame.id(), 0x123);
        assert!(!frame.is_extended());
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.data(), &[0xDE, 0xAD]);
    }

    #[test]
    fn test_new_with_extended_flag() {
        let frame = Frame::new(0x8000_0123, &[1]).unwrap();
        assert!(frame.is_extended());
        assert_eq!(frame.id(), 0x123);
        assert_eq!(frame.raw_id(), 0x8000_0123);
    }

    #[test]
    fn test_payload_too_long() {
        let err = Frame::standard(0x1, &[0; 9]).unwrap_err();
        assert_eq!(err, FrameError::TooMuchData(9));
    }

    #[test]
    fn test_standard_id_out_of_range() {
        assert_eq!(
            Frame::new(0x800, &[]).unwrap_err(),
            FrameError::StandardIdOutOfRange(0x800)
        );
        assert_eq!(
            Frame::extended(0x2000_0000, &[]).unwrap_err(),
            FrameError::ExtendedIdOutOfRange(0x2000_0000)
        );
    }

    #[test]
    fn test_equality_ignores_unused_bytes() {
        let a = Frame {
            raw_id: 0x10,
            len: 1,
            data: [7, 1, 2, 3, 4, 5, 6, 7],
        };
        let b = Frame::standard(0x10, &[7]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_candump_style() {
        let std = Frame::standard(0x7E0, &[0x02, 0x10, 0x01]).unwrap();
        assert_eq!(std.to_string(), "7E0#021001");

        let ext = Frame::extended(0x18DA_F110, &[]).unwrap();
        assert_eq!(ext.to_string(), "18DAF110#");
    }
}
