//! Capture lifecycle shared by the breath and clap detectors.
//!
//! A [`FrameSource`] produces frames on its own thread (the cpal callback, a
//! camera pipeline, …) and pushes them into a `std::sync::mpsc` channel.
//! [`SensorMonitor`] owns one source and one [`FrameDetector`]; while started
//! it runs a dedicated worker thread that feeds every frame to the detector.
//!
//! ```text
//! FrameSource ──frames (mpsc)──▶ worker thread ──feed_frame──▶ FrameDetector
//!                                                          └──▶ EventSender
//! ```
//!
//! `stop()` is idempotent and safe before `start()`.  A source that cannot be
//! opened leaves the monitor inert: the error is logged and returned, and no
//! event is ever emitted.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while acquiring a capture resource.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("unusable input format: {sample_rate} Hz, {channels} channel(s)")]
    InvalidFormat { sample_rate: u32, channels: u16 },

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("capture source unavailable: {0}")]
    Unavailable(String),

    #[error("failed to spawn detector thread: {0}")]
    Worker(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Something that delivers frames from a sensor.
///
/// `close` must drop every clone of the sender handed to `open`; that is what
/// ends the monitor's worker thread.
pub trait FrameSource {
    type Frame: Send + 'static;

    /// Acquire the device and start pushing frames into `tx`.
    fn open(&mut self, tx: mpsc::Sender<Self::Frame>) -> Result<(), CaptureError>;

    /// Release the device.  Must be safe to call when not open.
    fn close(&mut self);
}

/// A detector that turns frames into boolean "event happened" decisions.
pub trait FrameDetector: Send + 'static {
    type Frame;

    /// Process one frame; returns `true` when an event was emitted.
    fn feed_frame(&mut self, frame: &Self::Frame) -> bool;
}

// ---------------------------------------------------------------------------
// ExternalSource
// ---------------------------------------------------------------------------

/// Frame source fed by an external capture pipeline through a
/// [`FrameInjector`].
///
/// Used for camera-driven detectors, where landmark extraction happens
/// outside this crate, and by tests.
pub struct ExternalSource<F> {
    slot: Arc<Mutex<Option<mpsc::Sender<F>>>>,
}

impl<F> ExternalSource<F> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle the capture pipeline uses to push frames.
    pub fn injector(&self) -> FrameInjector<F> {
        FrameInjector {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<F> Default for ExternalSource<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Send + 'static> FrameSource for ExternalSource<F> {
    type Frame = F;

    fn open(&mut self, tx: mpsc::Sender<F>) -> Result<(), CaptureError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        Ok(())
    }

    fn close(&mut self) {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}

/// Cloneable producer handle for an [`ExternalSource`].
pub struct FrameInjector<F> {
    slot: Arc<Mutex<Option<mpsc::Sender<F>>>>,
}

impl<F> Clone for FrameInjector<F> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<F> FrameInjector<F> {
    /// Deliver a frame.  Returns `false` (frame discarded) while the source
    /// is closed.
    pub fn push(&self, frame: F) -> bool {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(tx) => tx.send(frame).is_ok(),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// SensorMonitor
// ---------------------------------------------------------------------------

/// Start/stop wrapper that drives a detector from a frame source.
pub struct SensorMonitor<S, D>
where
    S: FrameSource,
    D: FrameDetector<Frame = S::Frame>,
{
    name: &'static str,
    source: S,
    detector: Arc<Mutex<D>>,
    worker: Option<JoinHandle<()>>,
}

impl<S, D> SensorMonitor<S, D>
where
    S: FrameSource,
    D: FrameDetector<Frame = S::Frame>,
{
    /// `name` is used for the worker thread and log lines.
    pub fn new(name: &'static str, source: S, detector: D) -> Self {
        Self {
            name,
            source,
            detector: Arc::new(Mutex::new(detector)),
            worker: None,
        }
    }

    /// Open the source and start feeding the detector.
    ///
    /// Calling `start` while already running is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the source's [`CaptureError`]; the monitor stays stopped.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.worker.is_some() {
            log::debug!("{}: already running", self.name);
            return Ok(());
        }

        let (tx, rx) = mpsc::channel::<S::Frame>();
        if let Err(e) = self.source.open(tx) {
            log::error!("{}: capture unavailable, detector stays inert: {e}", self.name);
            return Err(e);
        }

        let detector = Arc::clone(&self.detector);
        let spawned = std::thread::Builder::new()
            .name(format!("{}-detector", self.name))
            .spawn(move || {
                while let Ok(frame) = rx.recv() {
                    let mut d = detector.lock().unwrap_or_else(|e| e.into_inner());
                    d.feed_frame(&frame);
                }
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                log::info!("{}: started", self.name);
                Ok(())
            }
            Err(e) => {
                self.source.close();
                log::error!("{}: {e}", self.name);
                Err(CaptureError::Worker(e))
            }
        }
    }

    /// Release the source and wait for the worker to finish.  Idempotent.
    pub fn stop(&mut self) {
        self.source.close();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::warn!("{}: detector thread panicked", self.name);
            }
            log::info!("{}: stopped", self.name);
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Run `f` with exclusive access to the detector.
    pub fn with_detector<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        let mut d = self.detector.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut d)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, D> Drop for SensorMonitor<S, D>
where
    S: FrameSource,
    D: FrameDetector<Frame = S::Frame>,
{
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
