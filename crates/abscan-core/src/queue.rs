//! Thread-safe frame buffer shared between a capture thread and its consumer

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::frame::Frame;

/// Unbounded FIFO of frames, safe to push from one thread and drain from
/// another without external locking.
#[derive(Debug, Default)]
pub struct FrameQueue {
    inner: Mutex<VecDeque<Frame>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, frame: Frame) {
        self.inner.lock().push_back(frame);
    }

    /// Remove and return every frame present at call time, oldest first.
    ///
    /// Frames pushed while the drain runs land either in this result or in
    /// the next drain, never in both.
    pub fn drain(&self) -> Vec<Frame> {
        let taken = std::mem::take(&mut *self.inner.lock());
        taken.into()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
