//! Linux `CAN_RAW` socket backed by the `socketcan` crate

use std::io;
use std::time::Duration;

use abscan_core::wire::{self, CAN_FRAME_SIZE, ERR_FLAG, RTR_FLAG};
use abscan_core::{BackendCode, Frame, TransportError, EXTENDED_FLAG, EXTENDED_MASK};
use socketcan::{CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Id, Socket, StandardId};
use tracing::{debug, error};

use super::RawCanSocket;

/// Raw CAN socket bound to one interface
///
/// Reads go through `read_frame_timeout`, so the capture thread sleeps in
/// the kernel instead of spinning and wakes at least once per timeout.
#[derive(Debug)]
pub struct LinuxCanSocket {
    inner: CanSocket,
    interface: String,
}

impl LinuxCanSocket {
    /// Open a raw socket and bind it to `interface` (e.g. `"can0"`).
    pub fn open(interface: &str) -> Result<Self, TransportError> {
        let inner = CanSocket::open(interface).map_err(|e| {
            error!(interface, error = %e, "Failed to open CAN socket");
            TransportError::initialization(
                format!("Failed to open CAN socket on {}: {}", interface, e),
                Some(BackendCode::from_io(&e)),
            )
        })?;

        debug!(interface, "CAN socket bound");
        Ok(Self {
            inner,
            interface: interface.to_string(),
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

/// Kernel record for a received frame, flags included
fn to_record(frame: &CanFrame) -> [u8; CAN_FRAME_SIZE] {
    let id_word = match EmbeddedFrame::id(frame) {
        Id::Standard(id) => u32::from(id.as_raw()),
        Id::Extended(id) => id.as_raw() | EXTENDED_FLAG,
    };
    let id_word = match frame {
        CanFrame::Data(_) => id_word,
        CanFrame::Remote(_) => id_word | RTR_FLAG,
        CanFrame::Error(_) => (id_word & EXTENDED_MASK) | ERR_FLAG,
    };
    wire::encode_raw(id_word, EmbeddedFrame::data(frame))
}

fn to_can_frame(frame: &Frame) -> io::Result<CanFrame> {
    let id = if frame.is_extended() {
        ExtendedId::new(frame.id()).map(Id::Extended)
    } else {
        u16::try_from(frame.id())
            .ok()
            .and_then(StandardId::new)
            .map(Id::Standard)
    };
    id.and_then(|id| <CanFrame as EmbeddedFrame>::new(id, frame.data()))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Frame {} cannot be encoded", frame),
            )
        })
}

impl RawCanSocket for LinuxCanSocket {
    fn read(&self, record: &mut [u8; CAN_FRAME_SIZE], timeout: Duration) -> io::Result<usize> {
        match self.inner.read_frame_timeout(timeout) {
            Ok(frame) => {
                *record = to_record(&frame);
                Ok(CAN_FRAME_SIZE)
            }
            Err(ref e)
                if e.kind() == io::ErrorKind::TimedOut || e.kind() == io::ErrorKind::WouldBlock =>
            {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn write(&self, record: &[u8; CAN_FRAME_SIZE]) -> io::Result<usize> {
        let frame = wire::decode(record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.inner.write_frame(&to_can_frame(&frame)?)?;
        Ok(CAN_FRAME_SIZE)
    }
}
