//! Exponential moving average over scalar samples.

/// Exponential moving average with a fixed retention factor.
///
/// Each update computes `value * retain + sample * (1 - retain)`.  The
/// initial value is `0.0`, so the first few updates ramp up from silence.
///
/// ```rust
/// use emotion_core::signal::SignalSmoother;
///
/// let mut s = SignalSmoother::new(0.85);
/// let v = s.update(1.0);
/// assert!((v - 0.15).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    retain: f32,
    value: f32,
}

impl SignalSmoother {
    /// Create a smoother that keeps `retain` of the previous value per update.
    ///
    /// `retain` is clamped to `[0.0, 1.0]`.
    pub fn new(retain: f32) -> Self {
        Self {
            retain: retain.clamp(0.0, 1.0),
            value: 0.0,
        }
    }

    /// Fold `sample` into the average and return the new value.
    pub fn update(&mut self, sample: f32) -> f32 {
        self.value = self.value * self.retain + sample * (1.0 - self.retain);
        self.value
    }

    /// Current smoothed value.
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn retain(&self) -> f32 {
        self.retain
    }

    /// Reset the average back to `0.0`.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_towards_constant_input() {
        let mut s = SignalSmoother::new(0.85);
        for _ in 0..200 {
            s.update(0.4);
        }
        assert!((s.value() - 0.4).abs() < 1e-4);
    }

    #[test]
    fn follows_recurrence() {
        let mut s = SignalSmoother::new(0.85);
        s.update(1.0);
        let v = s.update(0.0);
        assert!((v - 0.15 * 0.85).abs() < 1e-6);
    }

    #[test]
    fn retain_is_clamped() {
        assert_eq!(SignalSmoother::new(1.5).retain(), 1.0);
        assert_eq!(SignalSmoother::new(-0.2).retain(), 0.0);
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut s = SignalSmoother::new(0.5);
        s.update(1.0);
        s.reset();
        assert_eq!(s.value(), 0.0);
    }
}
