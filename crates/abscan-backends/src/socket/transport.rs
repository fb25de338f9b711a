//! Socket transport with a background capture thread

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use abscan_core::wire::{self, CAN_FRAME_SIZE};
use abscan_core::{BackendCode, CanTransport, Frame, FrameQueue, Incoming, TransportError};
use tracing::{debug, error, info, trace, warn};

use crate::config::SocketConfig;

/// Byte-level capabilities of an open, bound raw CAN socket
///
/// Implementations must allow `read` on the capture thread concurrently
/// with `write` on the caller's thread.
pub trait RawCanSocket: Send + Sync + 'static {
    /// Read one raw record, waiting at most `timeout` for it to arrive.
    ///
    /// Returns `Ok(0)` when nothing arrived within the timeout.
    fn read(&self, record: &mut [u8; CAN_FRAME_SIZE], timeout: Duration) -> io::Result<usize>;

    /// Write one raw record, returning the number of bytes written.
    fn write(&self, record: &[u8; CAN_FRAME_SIZE]) -> io::Result<usize>;
}

impl<S: RawCanSocket + ?Sized> RawCanSocket for Arc<S> {
    fn read(&self, record: &mut [u8; CAN_FRAME_SIZE], timeout: Duration) -> io::Result<usize> {
        (**self).read(record, timeout)
    }

    fn write(&self, record: &[u8; CAN_FRAME_SIZE]) -> io::Result<usize> {
        (**self).write(record)
    }
}

/// Counters maintained by the capture thread
///
/// Read and decode failures never reach the caller as errors; they are
/// counted here instead.
#[derive(Debug, Default)]
pub struct CaptureStats {
    frames_received: AtomicU64,
    read_errors: AtomicU64,
    decode_errors: AtomicU64,
}

impl CaptureStats {
    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }
}

/// CAN transport over a raw socket
///
/// `start()` spawns one capture thread that keeps reading while the alive
/// flag is set; `stop()` clears the flag and joins it. Each read is bounded
/// by the configured read timeout, so the join completes within about one
/// timeout period.
pub struct SocketTransport<S: RawCanSocket> {
    name: String,
    socket: Arc<S>,
    queue: Arc<FrameQueue>,
    alive: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
    read_timeout: Duration,
    capture_handle: Option<JoinHandle<()>>,
}

impl<S: RawCanSocket> SocketTransport<S> {
    /// Wrap an already open socket. Capture is not started.
    pub fn new(socket: S, name: impl Into<String>, read_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            socket: Arc::new(socket),
            queue: Arc::new(FrameQueue::new()),
            alive: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(CaptureStats::default()),
            read_timeout,
            capture_handle: None,
        }
    }

    /// Wrap an open socket using the timeouts and start policy in `config`
    pub fn with_config(socket: S, config: &SocketConfig) -> Result<Self, TransportError> {
        config.validate()?;
        let mut transport = Self::new(socket, config.interface.clone(), config.read_timeout());
        if config.capture_on_open {
            transport.start()?;
        }
        Ok(transport)
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    /// Frames captured but not yet polled
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn spawn_capture(&mut self) -> Result<(), TransportError> {
        let ctx = CaptureContext {
            socket: self.socket.clone(),
            queue: self.queue.clone(),
            alive: self.alive.clone(),
            running: self.running.clone(),
            stats: self.stats.clone(),
            read_timeout: self.read_timeout,
        };

        self.alive.store(true, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name(format!("can-capture-{}", self.name))
            .spawn(move || ctx.run());

        match spawned {
            Ok(handle) => {
                self.capture_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.alive.store(false, Ordering::SeqCst);
                error!(interface = %self.name, error = %e, "Failed to spawn capture thread");
                Err(TransportError::initialization(
                    format!("Failed to spawn capture thread: {}", e),
                    Some(BackendCode::from_io(&e)),
                ))
            }
        }
    }

    fn join_capture(&mut self) {
        if let Some(handle) = self.capture_handle.take() {
            if handle.join().is_err() {
                error!(interface = %self.name, "Capture thread panicked");
            }
        }
    }
}

#[cfg(all(target_os = "linux", feature = "socketcan"))]
impl SocketTransport<super::LinuxCanSocket> {
    /// Open and bind the interface named in `config`
    pub fn open(config: &SocketConfig) -> Result<Self, TransportError> {
        config.validate()?;
        let socket = super::LinuxCanSocket::open(&config.interface)?;
        Self::with_config(socket, config)
    }
}

impl<S: RawCanSocket> CanTransport for SocketTransport<S> {
    fn send(&mut self, frame: &Frame) -> Result<usize, TransportError> {
        let record = wire::encode(frame);
        match self.socket.write(&record) {
            Ok(n) if n == CAN_FRAME_SIZE => {
                trace!(interface = %self.name, %frame, "Frame sent");
                Ok(n)
            }
            Ok(n) => {
                warn!(interface = %self.name, written = n, "Short write on CAN socket");
                Err(TransportError::Transmit(BackendCode::ShortWrite(n)))
            }
            Err(e) => {
                debug!(interface = %self.name, error = %e, "CAN socket write failed");
                Err(TransportError::Transmit(BackendCode::from_io(&e)))
            }
        }
    }

    fn poll_incoming(&mut self) -> Incoming {
        Incoming::new(self.queue.drain())
    }

    fn start(&mut self) -> Result<(), TransportError> {
        if self.alive.load(Ordering::SeqCst) {
            return Ok(());
        }
        // A previous thread that has already left its loop
        self.join_capture();
        self.spawn_capture()?;
        info!(interface = %self.name, "CAN capture started");
        Ok(())
    }

    fn stop(&mut self) {
        if !self.alive.swap(false, Ordering::SeqCst) && self.capture_handle.is_none() {
            return;
        }
        self.join_capture();
        info!(
            interface = %self.name,
            frames = self.stats.frames_received(),
            read_errors = self.stats.read_errors(),
            "CAN capture stopped"
        );
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<S: RawCanSocket> Drop for SocketTransport<S> {
    fn drop(&mut self) {
        self.stop();
        self.queue.clear();
    }
}

/// State moved onto the capture thread
struct CaptureContext<S> {
    socket: Arc<S>,
    queue: Arc<FrameQueue>,
    alive: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
    read_timeout: Duration,
}

impl<S: RawCanSocket> CaptureContext<S> {
    fn run(self) {
        let _running = RunningGuard::enter(&self.running, &self.alive);
        let mut record = [0u8; CAN_FRAME_SIZE];

        while self.alive.load(Ordering::SeqCst) {
            match self.socket.read(&mut record, self.read_timeout) {
                Ok(0) => {}
                Ok(n) if n == CAN_FRAME_SIZE => self.accept(&record),
                Ok(n) => {
                    let count = self.stats.decode_errors.fetch_add(1, Ordering::Relaxed) + 1;
                    if count.is_power_of_two() {
                        warn!(bytes = n, count, "Short read on CAN socket, record dropped");
                    }
                }
                Err(ref e) if is_transient(e) => {}
                Err(e) => {
                    let count = self.stats.read_errors.fetch_add(1, Ordering::Relaxed) + 1;
                    if count.is_power_of_two() {
                        warn!(error = %e, count, "CAN socket read error");
                    }
                    // Back off so a downed interface does not spin the thread
                    thread::sleep(self.read_timeout);
                }
            }
        }
        debug!("CAN capture thread exiting");
    }

    fn accept(&self, record: &[u8; CAN_FRAME_SIZE]) {
        match wire::decode(record) {
            Ok(frame) => {
                trace!(%frame, "Frame captured");
                self.queue.push(frame);
                self.stats.frames_received.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                let count = self.stats.decode_errors.fetch_add(1, Ordering::Relaxed) + 1;
                if count.is_power_of_two() {
                    warn!(error = %e, count, "Dropped undecodable CAN record");
                }
            }
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

/// Holds the running flag high for as long as the capture loop executes.
/// An unwinding exit also clears `alive`, so the next `start()` respawns.
struct RunningGuard<'a> {
    running: &'a AtomicBool,
    alive: &'a AtomicBool,
}

impl<'a> RunningGuard<'a> {
    fn enter(running: &'a AtomicBool, alive: &'a AtomicBool) -> Self {
        running.store(true, Ordering::SeqCst);
        Self { running, alive }
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.alive.store(false, Ordering::SeqCst);
        }
        self.running.store(false, Ordering::SeqCst);
    }
}
