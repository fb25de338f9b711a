//! Transport capability trait and poll result

use crate::error::TransportError;
use crate::frame::Frame;

/// Frames returned by one [`CanTransport::poll_incoming`] call.
///
/// A receive failure does not discard what was already read: `frames`
/// holds every frame decoded before `error` was hit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub frames: Vec<Frame>,
    pub error: Option<TransportError>,
}

impl Incoming {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            error: None,
        }
    }

    pub fn failed(frames: Vec<Frame>, error: TransportError) -> Self {
        Self {
            frames,
            error: Some(error),
        }
    }

    /// True iff the poll returned at least one frame
    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Fail if the poll hit an error, dropping the partial frames.
    pub fn into_result(self) -> Result<Vec<Frame>, TransportError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.frames),
        }
    }
}

/// Backend-agnostic interface for sending and receiving CAN frames
///
/// Implemented by the raw-socket transport, which captures on a background
/// thread, and by the vendor adapter transport, which drains the driver
/// queue synchronously inside [`poll_incoming`](CanTransport::poll_incoming).
/// A single instance is not meant to be driven from several threads at
/// once; methods that touch the backend take `&mut self`.
pub trait CanTransport: Send {
    /// Transmit one frame directly, bypassing any receive buffering.
    ///
    /// # Returns
    /// The number of bytes handed to the backend
    fn send(&mut self, frame: &Frame) -> Result<usize, TransportError>;

    /// Return whatever frames are currently available, oldest first.
    fn poll_incoming(&mut self) -> Incoming;

    /// Begin receiving (spawn capture or initialize the channel).
    fn start(&mut self) -> Result<(), TransportError>;

    /// Stop receiving. Blocks until background activity has ended.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    fn is_alive(&self) -> bool;

    /// Interface or channel label for diagnostics
    fn name(&self) -> &str;
}

impl<T: CanTransport + ?Sized> CanTransport for Box<T> {
    fn send(&mut self, frame: &Frame) -> Result<usize, TransportError> {
        (**self).send(frame)
    }

    fn poll_incoming(&mut self) -> Incoming {
        (**self).poll_incoming()
    }

    fn start(&mut self) -> Result<(), TransportError> {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }

    fn is_alive(&self) -> bool {
        (**self).is_alive()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
