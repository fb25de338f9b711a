//! Mock raw socket for testing

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use abscan_core::wire::{self, CAN_FRAME_SIZE};
use abscan_core::Frame;
use parking_lot::{Condvar, Mutex};

use super::RawCanSocket;

enum ScriptedRead {
    Record([u8; CAN_FRAME_SIZE]),
    Error(io::ErrorKind),
}

#[derive(Default)]
struct State {
    reads: VecDeque<ScriptedRead>,
    written: Vec<[u8; CAN_FRAME_SIZE]>,
    write_errno: Option<i32>,
    short_write: Option<usize>,
    loopback: bool,
}

/// In-memory stand-in for a bound `CAN_RAW` socket
///
/// Reads are served from a script of injected records and errors; an empty
/// script blocks for the read timeout and then reports no data, like a
/// socket with nothing on the bus.
#[derive(Default)]
pub struct MockSocket {
    state: Mutex<State>,
    readable: Condvar,
}

impl MockSocket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed written frames back to the reader, like a socket with
    /// `CAN_RAW_RECV_OWN_MSGS` enabled.
    pub fn with_loopback(self) -> Self {
        self.state.lock().loopback = true;
        self
    }

    /// Queue a frame to be delivered by the next read
    pub fn inject_frame(&self, frame: Frame) {
        self.inject_record(wire::encode(&frame));
    }

    /// Queue a raw record, which need not decode cleanly
    pub fn inject_record(&self, record: [u8; CAN_FRAME_SIZE]) {
        self.push(ScriptedRead::Record(record));
    }

    /// Queue a read failure
    pub fn inject_error(&self, kind: io::ErrorKind) {
        self.push(ScriptedRead::Error(kind));
    }

    /// Make subsequent writes fail with `errno` (None restores success)
    pub fn fail_writes(&self, errno: Option<i32>) {
        self.state.lock().write_errno = errno;
    }

    /// Make subsequent writes report only `n` bytes written
    pub fn short_writes(&self, n: Option<usize>) {
        self.state.lock().short_write = n;
    }

    /// Scripted reads not yet consumed
    pub fn pending_reads(&self) -> usize {
        self.state.lock().reads.len()
    }

    /// Frames written so far, decoded
    pub fn sent(&self) -> Vec<Frame> {
        self.state
            .lock()
            .written
            .iter()
            .filter_map(|record| wire::decode(record).ok())
            .collect()
    }

    fn push(&self, read: ScriptedRead) {
        self.state.lock().reads.push_back(read);
        self.readable.notify_all();
    }
}

impl RawCanSocket for MockSocket {
    fn read(&self, record: &mut [u8; CAN_FRAME_SIZE], timeout: Duration) -> io::Result<usize> {
        let mut state = self.state.lock();
        if state.reads.is_empty() {
            self.readable.wait_for(&mut state, timeout);
        }
        match state.reads.pop_front() {
            Some(ScriptedRead::Record(bytes)) => {
                *record = bytes;
                Ok(CAN_FRAME_SIZE)
            }
            Some(ScriptedRead::Error(kind)) => Err(io::Error::from(kind)),
            None => Ok(0),
        }
    }

    fn write(&self, record: &[u8; CAN_FRAME_SIZE]) -> io::Result<usize> {
        let mut state = self.state.lock();
        if let Some(errno) = state.write_errno {
            return Err(io::Error::from_raw_os_error(errno));
        }
        state.written.push(*record);
        if state.loopback {
            state.reads.push_back(ScriptedRead::Record(*record));
            self.readable.notify_all();
        }
        Ok(state.short_write.unwrap_or(CAN_FRAME_SIZE))
    }
}
