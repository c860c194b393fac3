//! Detector → game-loop event channel.
//!
//! Detectors run on capture threads; game state lives on the owning loop.
//! The only hand-off between the two is a [`DetectorEvent`] posted through an
//! [`EventSender`].  Posting never blocks: if the loop has fallen behind and
//! the channel is full the event is dropped and logged.
//!
//! ```rust
//! use std::time::Duration;
//! use emotion_core::events::{event_channel, DetectorEvent};
//!
//! let (tx, mut rx) = event_channel(8);
//! assert!(tx.emit(DetectorEvent::Clap { at: Duration::from_millis(900) }));
//! assert_eq!(rx.try_recv().unwrap().label(), "clap");
//! ```

use std::time::Duration;

use tokio::sync::mpsc;

use crate::vision::Emotion;

// ---------------------------------------------------------------------------
// DetectorEvent
// ---------------------------------------------------------------------------

/// A discrete event produced by one of the detectors.
///
/// `at` is the detector clock time at which the event was decided.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorEvent {
    /// A breath (blow into the microphone) was detected.
    Breath { at: Duration },
    /// Two hands came together in a clapping motion.
    Clap { at: Duration },
    /// The expected facial expression was held and captured.
    ExpressionCaptured { emotion: Emotion, at: Duration },
}

impl DetectorEvent {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            DetectorEvent::Breath { .. } => "breath",
            DetectorEvent::Clap { .. } => "clap",
            DetectorEvent::ExpressionCaptured { .. } => "expression",
        }
    }

    pub fn at(&self) -> Duration {
        match self {
            DetectorEvent::Breath { at }
            | DetectorEvent::Clap { at }
            | DetectorEvent::ExpressionCaptured { at, .. } => *at,
        }
    }
}

// ---------------------------------------------------------------------------
// EventSender
// ---------------------------------------------------------------------------

/// Cloneable, non-blocking producer half of the event channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<DetectorEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<DetectorEvent>) -> Self {
        Self { tx }
    }

    /// Post `event` without waiting.  Returns `false` when it was dropped.
    pub fn emit(&self, event: DetectorEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(ev)) => {
                log::warn!("events: channel full, dropping {} event", ev.label());
                false
            }
            Err(mpsc::error::TrySendError::Closed(ev)) => {
                log::debug!("events: receiver gone, dropping {} event", ev.label());
                false
            }
        }
    }

    /// `true` once the consuming loop has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a bounded single-consumer event channel.
pub fn event_channel(capacity: usize) -> (EventSender, mpsc::Receiver<DetectorEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender::new(tx), rx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
