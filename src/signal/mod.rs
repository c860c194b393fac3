//! Shared signal primitives used by every detector.
//!
//! * [`SignalSmoother`]: exponential moving average (breath energy).
//! * [`RingBuffer`]: fixed-capacity history (clap wrist distances).
//! * [`Clock`]: monotonic time source; [`ManualClock`] for tests and replay.

pub mod buffer;
pub mod clock;
pub mod smoother;

pub use buffer::RingBuffer;
pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock};
pub use smoother::SignalSmoother;

/// Root-mean-square amplitude of `samples`; `0.0` for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    mean_sq.sqrt()
}
