//! Clap detection from two-hand landmark frames.
//!
//! A clap is recognised from the recent history of wrist-to-wrist
//! distances rather than from a single frame:
//!
//! ```text
//! frame ─▶ exactly two confident hands? ──no──▶ ignored (no state change)
//!        ─▶ push wrist distance into 6-slot history
//!        ─▶ hands aligned?            (vertical offset, span mismatch)
//!        ─▶ clap motion?              (closing fast, touching, closed/rebound)
//!        ─▶ cooldown over?            (≥ 0.4 s since last clap)
//!        ─▶ DetectorEvent::Clap
//! ```
//!
//! The history is never cleared on a clap; the cooldown alone keeps one
//! clap from being reported twice.

use std::time::Duration;

use crate::config::ClapConfig;
use crate::events::{DetectorEvent, EventSender};
use crate::sensor::FrameDetector;
use crate::signal::{RingBuffer, SharedClock};

use super::landmarks::{HandFrame, HandObservation};

/// Motion-pattern clap detector.
pub struct ClapDetector {
    config: ClapConfig,
    history: RingBuffer<f32>,
    last_clap: Option<Duration>,
    clock: SharedClock,
    sink: Option<EventSender>,
}

impl ClapDetector {
    pub fn new(config: ClapConfig, clock: SharedClock) -> Self {
        // first / middle / last must be distinct samples
        let history = RingBuffer::new(config.history_len.max(3));
        Self {
            config,
            history,
            last_clap: None,
            clock,
            sink: None,
        }
    }

    /// Post every detected clap to `sink`.
    pub fn with_sink(mut self, sink: EventSender) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Process one frame, timestamped by the detector's clock.
    pub fn feed(&mut self, frame: &HandFrame) -> bool {
        let now = self.clock.now();
        self.feed_at(frame, now)
    }

    /// Process one frame observed at `now`; returns `true` on a clap.
    pub fn feed_at(&mut self, frame: &HandFrame, now: Duration) -> bool {
        let Some((a, b)) = frame.confident_pair(self.config.min_confidence) else {
            return false;
        };

        let wrist_distance = a.wrist.location.distance(&b.wrist.location);
        let finger_distance = a.fingertip.location.distance(&b.fingertip.location);
        self.history.push(wrist_distance);

        if !self.hands_aligned(a, b, wrist_distance, finger_distance)
            || !self.clap_motion()
            || !self.cooldown_over(now)
        {
            return false;
        }

        self.last_clap = Some(now);
        log::debug!(
            "clap: detected at {:.3}s (wrist distance {wrist_distance:.3})",
            now.as_secs_f32()
        );
        if let Some(sink) = &self.sink {
            sink.emit(DetectorEvent::Clap { at: now });
        }
        true
    }

    fn hands_aligned(
        &self,
        a: &HandObservation,
        b: &HandObservation,
        wrist_distance: f32,
        finger_distance: f32,
    ) -> bool {
        let vertical = (a.wrist.location.y - b.wrist.location.y).abs();
        let span_mismatch = (wrist_distance - finger_distance).abs();
        vertical < self.config.max_vertical_offset && span_mismatch < self.config.max_span_mismatch
    }

    fn clap_motion(&self) -> bool {
        if !self.history.is_full() {
            return false;
        }
        let (Some(first), Some(mid), Some(last)) = (
            self.history.first(),
            self.history.get(self.history.capacity() / 2),
            self.history.last(),
        ) else {
            return false;
        };

        let closing_fast = first - mid > self.config.closing_speed;
        let touching = mid < self.config.contact_distance;
        let stays_closed = last < self.config.stays_closed_distance;
        let rebounds = last - mid > self.config.reopen_distance;

        closing_fast && touching && (stays_closed || rebounds)
    }

    fn cooldown_over(&self, now: Duration) -> bool {
        match self.last_clap {
            Some(last) => now.saturating_sub(last) >= self.config.cooldown(),
            None => true,
        }
    }

    /// Wrist distances currently held, oldest first.
    pub fn distance_history(&self) -> Vec<f32> {
        self.history.iter().collect()
    }

    pub fn last_clap(&self) -> Option<Duration> {
        self.last_clap
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last_clap = None;
    }
}

impl FrameDetector for ClapDetector {
    type Frame = HandFrame;

    fn feed_frame(&mut self, frame: &HandFrame) -> bool {
        self.feed(frame)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
