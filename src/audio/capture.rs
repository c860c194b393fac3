//! Microphone capture via `cpal`.
//!
//! [`MicrophoneSource`] wraps the cpal host/device/stream lifecycle and
//! implements [`FrameSource`], so a [`crate::sensor::SensorMonitor`] can
//! start and stop it.  Every hardware buffer is forwarded as an
//! [`AudioChunk`] over an mpsc channel; dropping the stream on `close` also
//! drops the channel sender.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::sensor::{CaptureError, FrameSource};

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A single buffer of raw audio as delivered by the cpal callback.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved PCM samples.
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz.  Never `0` for chunks produced here.
    pub sample_rate: u32,
    /// Number of interleaved channels (1 = mono, 2 = stereo, …).
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// MicrophoneSource
// ---------------------------------------------------------------------------

/// Default-input-device capture built on top of `cpal`.
///
/// The device is only touched on [`open`](FrameSource::open), so building a
/// `MicrophoneSource` never fails.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use emotion_core::audio::{BreathDetector, MicrophoneSource};
/// use emotion_core::config::BreathConfig;
/// use emotion_core::sensor::SensorMonitor;
/// use emotion_core::signal::MonotonicClock;
///
/// let detector = BreathDetector::new(BreathConfig::default(), Arc::new(MonotonicClock::start()));
/// let mut monitor = SensorMonitor::new("breath", MicrophoneSource::new(), detector);
/// if monitor.start().is_ok() {
///     // ... breath events flow to the detector's sink ...
///     monitor.stop();
/// }
/// ```
#[derive(Default)]
pub struct MicrophoneSource {
    stream: Option<cpal::Stream>,
    sample_rate: u32,
    channels: u16,
}

impl MicrophoneSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Native sample rate of the open stream in Hz (`0` while closed).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels of the open stream.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl FrameSource for MicrophoneSource {
    type Frame = AudioChunk;

    /// Query the default input device and start streaming.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoDevice`] without an input device,
    /// [`CaptureError::InvalidFormat`] when the device reports a zero sample
    /// rate or channel count, or the cpal error that stopped the stream from
    /// being built or started.
    fn open(&mut self, tx: mpsc::Sender<AudioChunk>) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;
        let supported = device.default_input_config()?;

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        if sample_rate == 0 || channels == 0 {
            return Err(CaptureError::InvalidFormat {
                sample_rate,
                channels,
            });
        }
        let config: cpal::StreamConfig = supported.into();

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let chunk = AudioChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                };
                // Ignore send errors; the detector thread may have exited.
                let _ = tx.send(chunk);
            },
            |err: cpal::StreamError| {
                log::error!("microphone: cpal stream error: {err}");
            },
            None,
        )?;
        stream.play()?;

        log::info!("microphone: capture started ({sample_rate} Hz, {channels} ch)");
        self.sample_rate = sample_rate;
        self.channels = channels;
        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::debug!("microphone: pause on close failed: {e}");
            }
            drop(stream);
            log::info!("microphone: capture stopped");
        }
        self.sample_rate = 0;
        self.channels = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// `AudioChunk` must be `Send` so it can cross to the detector thread.
    #[test]
    fn audio_chunk_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioChunk>();
    }

    #[test]
    fn close_without_open_is_harmless() {
        let mut mic = MicrophoneSource::new();
        mic.close();
        mic.close();
        assert!(!mic.is_open());
        assert_eq!(mic.sample_rate(), 0);
    }
}
