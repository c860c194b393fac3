//! Energy-based breath detection.
//!
//! Blowing into the microphone produces broadband noise with a fairly
//! steady amplitude.  [`BreathDetector`] reduces every capture buffer to its
//! RMS amplitude, folds it into an exponential moving average and emits a
//! breath event when the smoothed energy sits inside a band:
//!
//! ```text
//! rms(buffer) ─▶ smoothed = smoothed*0.85 + rms*0.15
//!              ─▶ 0.05 < smoothed < 1.0  AND  ≥ 0.15 s since last breath
//!              ─▶ DetectorEvent::Breath
//! ```
//!
//! Silence and clipping are not errors; they simply never produce an event.

use std::time::Duration;

use crate::config::BreathConfig;
use crate::events::{DetectorEvent, EventSender};
use crate::sensor::FrameDetector;
use crate::signal::{rms, SharedClock, SignalSmoother};

use super::capture::AudioChunk;
use super::mix::stereo_to_mono;

// ---------------------------------------------------------------------------
// BreathDetector
// ---------------------------------------------------------------------------

/// Thresholded, cooldown-gated breath detector.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use emotion_core::audio::BreathDetector;
/// use emotion_core::config::BreathConfig;
/// use emotion_core::signal::ManualClock;
///
/// let mut detector = BreathDetector::new(BreathConfig::default(), Arc::new(ManualClock::new()));
///
/// // A steady blow: the smoothed energy ramps up past 0.05 after a few buffers.
/// let blow = vec![0.3_f32; 512];
/// let fired = (0..10)
///     .filter(|i| detector.feed_at(&blow, Duration::from_millis(200 * i)))
///     .count();
/// assert!(fired > 0);
/// ```
pub struct BreathDetector {
    config: BreathConfig,
    smoother: SignalSmoother,
    last_breath: Option<Duration>,
    clock: SharedClock,
    sink: Option<EventSender>,
}

impl BreathDetector {
    pub fn new(config: BreathConfig, clock: SharedClock) -> Self {
        let smoother = SignalSmoother::new(config.smoothing);
        Self {
            config,
            smoother,
            last_breath: None,
            clock,
            sink: None,
        }
    }

    /// Post every detected breath to `sink`.
    pub fn with_sink(mut self, sink: EventSender) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Process one mono buffer, timestamped by the detector's clock.
    pub fn feed(&mut self, samples: &[f32]) -> bool {
        let now = self.clock.now();
        self.feed_at(samples, now)
    }

    /// Process one mono buffer observed at `now`.
    ///
    /// Returns `true` when a breath event was emitted.  Empty buffers are
    /// ignored and leave the smoothed energy untouched.
    pub fn feed_at(&mut self, samples: &[f32], now: Duration) -> bool {
        if samples.is_empty() {
            return false;
        }

        let smoothed = self.smoother.update(rms(samples));
        let in_band = smoothed > self.config.high_pass_threshold
            && smoothed < self.config.low_pass_threshold;
        if !in_band || !self.cooldown_over(now) {
            return false;
        }

        self.last_breath = Some(now);
        log::debug!("breath: detected at {:.3}s (energy {smoothed:.4})", now.as_secs_f32());
        if let Some(sink) = &self.sink {
            sink.emit(DetectorEvent::Breath { at: now });
        }
        true
    }

    fn cooldown_over(&self, now: Duration) -> bool {
        match self.last_breath {
            Some(last) => now.saturating_sub(last) >= self.config.min_breath_interval(),
            None => true,
        }
    }

    /// Current smoothed RMS energy.
    pub fn smoothed_energy(&self) -> f32 {
        self.smoother.value()
    }

    /// Time of the last emitted breath, if any.
    pub fn last_breath(&self) -> Option<Duration> {
        self.last_breath
    }

    /// Forget the smoothed energy and cooldown.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.last_breath = None;
    }
}

impl FrameDetector for BreathDetector {
    type Frame = AudioChunk;

    fn feed_frame(&mut self, chunk: &AudioChunk) -> bool {
        if chunk.sample_rate == 0 || chunk.channels == 0 {
            return false;
        }
        if chunk.channels == 1 {
            self.feed(&chunk.samples)
        } else {
            let mono = stereo_to_mono(&chunk.samples, chunk.channels);
            self.feed(&mono)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::event_channel;
    use crate::signal::ManualClock;

    fn detector() -> (BreathDetector, ManualClock) {
        let clock = ManualClock::new();
        let d = BreathDetector::new(BreathConfig::default(), Arc::new(clock.clone()));
        (d, clock)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn quiet_room_never_emits() {
        let (mut d, _) = detector();
        let quiet = vec![0.04_f32; 512];
        for i in 0..500 {
            assert!(!d.feed_at(&quiet, ms(10 * i)));
        }
        assert!(d.smoothed_energy() < 0.05);
    }

    #[test]
    fn emissions_only_happen_inside_the_band() {
        let (mut d, _) = detector();
        let loud = vec![2.0_f32; 256];
        for i in 0..300 {
            if d.feed_at(&loud, ms(10 * i)) {
                let e = d.smoothed_energy();
                assert!(e > 0.05 && e < 1.0, "emitted at energy {e}");
            }
        }
        // Once saturated the energy stays above the low-pass ceiling.
        assert!(d.smoothed_energy() > 1.0);
        assert!(!d.feed_at(&loud, ms(10_000)));
    }

    #[test]
    fn breaths_are_at_least_cooldown_apart() {
        let (mut d, _) = detector();
        let blow = vec![0.3_f32; 512];
        let mut times = Vec::new();
        for i in 0..200 {
            let now = ms(7 * i);
            if d.feed_at(&blow, now) {
                times.push(now);
            }
        }
        assert!(times.len() > 2);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= ms(150));
        }
    }

    #[test]
    fn first_breath_is_not_gated() {
        let (mut d, _) = detector();
        let blow = vec![0.6_f32; 512];
        // 0.6 * 0.15 = 0.09 > 0.05 on the very first buffer
        assert!(d.feed_at(&blow, Duration::ZERO));
        assert_eq!(d.last_breath(), Some(Duration::ZERO));
    }

    #[test]
    fn empty_buffer_is_ignored() {
        let (mut d, _) = detector();
        assert!(!d.feed_at(&[], ms(0)));
        assert_eq!(d.smoothed_energy(), 0.0);
    }

    #[test]
    fn feed_uses_detector_clock_and_sink() {
        let (tx, mut rx) = event_channel(8);
        let (d, clock) = detector();
        let mut d = d.with_sink(tx);

        clock.set(ms(500));
        assert!(d.feed(&vec![0.6_f32; 128]));
        clock.advance(ms(100));
        assert!(!d.feed(&vec![0.6_f32; 128]), "inside cooldown");
        clock.advance(ms(100));
        assert!(d.feed(&vec![0.6_f32; 128]));

        assert_eq!(rx.try_recv().unwrap(), DetectorEvent::Breath { at: ms(500) });
        assert_eq!(rx.try_recv().unwrap(), DetectorEvent::Breath { at: ms(700) });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stereo_chunks_are_downmixed_and_zero_rate_skipped() {
        let (mut d, _) = detector();
        let bad = AudioChunk {
            samples: vec![0.6; 256],
            sample_rate: 0,
            channels: 2,
        };
        assert!(!d.feed_frame(&bad));
        assert_eq!(d.smoothed_energy(), 0.0);

        let stereo = AudioChunk {
            samples: vec![0.6; 256],
            sample_rate: 48_000,
            channels: 2,
        };
        assert!(d.feed_frame(&stereo));
    }

    #[test]
    fn reset_clears_energy_and_cooldown() {
        let (mut d, _) = detector();
        d.feed_at(&vec![0.6_f32; 64], ms(0));
        d.reset();
        assert_eq!(d.smoothed_energy(), 0.0);
        assert!(d.last_breath().is_none());
        assert!(d.feed_at(&vec![0.6_f32; 64], ms(10)));
    }
}
