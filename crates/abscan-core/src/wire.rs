//! Raw-socket wire record
//!
//! Mirrors the kernel's `struct can_frame` in native byte order:
//!
//! ```text
//! offset  0      4    5     6      7         8            16
//!         can_id len  pad  res0  len8_dlc   data[8]
//! ```

use thiserror::Error;

use crate::frame::{Frame, FrameError, EXTENDED_FLAG, EXTENDED_MASK, MAX_DATA_LEN, STANDARD_MASK};

/// Size of one raw CAN record as read from or written to the socket
pub const CAN_FRAME_SIZE: usize = 16;

/// Remote transmission request flag (bit 30)
pub const RTR_FLAG: u32 = 0x4000_0000;

/// Error message frame flag (bit 29)
pub const ERR_FLAG: u32 = 0x2000_0000;

const DATA_OFFSET: usize = 8;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    #[error("record length byte {0} exceeds 8")]
    InvalidLength(u8),

    #[error("error frame received (class 0x{0:08X})")]
    ErrorFrame(u32),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Encode a frame into a raw record. Padding bytes are zeroed.
pub fn encode(frame: &Frame) -> [u8; CAN_FRAME_SIZE] {
    encode_raw(frame.raw_id(), frame.data())
}

/// Build a record from a kernel id word, which may carry the RTR or ERR
/// flags. Data past 8 bytes is truncated.
pub fn encode_raw(can_id: u32, data: &[u8]) -> [u8; CAN_FRAME_SIZE] {
    let len = data.len().min(MAX_DATA_LEN);
    let mut record = [0u8; CAN_FRAME_SIZE];
    record[..4].copy_from_slice(&can_id.to_ne_bytes());
    record[4] = len as u8;
    record[DATA_OFFSET..DATA_OFFSET + len].copy_from_slice(&data[..len]);
    record
}

/// Decode a raw record. The RTR flag is dropped; error frames are rejected.
pub fn decode(record: &[u8; CAN_FRAME_SIZE]) -> Result<Frame, WireError> {
    let mut id_bytes = [0u8; 4];
    id_bytes.copy_from_slice(&record[..4]);
    let can_id = u32::from_ne_bytes(id_bytes);

    if can_id & ERR_FLAG != 0 {
        return Err(WireError::ErrorFrame(can_id & EXTENDED_MASK));
    }

    let len = record[4];
    if len as usize > MAX_DATA_LEN {
        return Err(WireError::InvalidLength(len));
    }
    let data = &record[DATA_OFFSET..DATA_OFFSET + len as usize];

    let frame = if can_id & EXTENDED_FLAG != 0 {
        Frame::extended(can_id & EXTENDED_MASK, data)?
    } else {
        Frame::standard(can_id & STANDARD_MASK, data)?
    };
    Ok(frame)
}
