//! Fixed-capacity circular (ring) buffer for detector history.
//!
//! When the buffer is full, new samples **overwrite** the oldest data so that
//! the most-recent `capacity` values are always available.  The clap detector
//! keeps its wrist-distance history in one of these.
//!
//! # Example
//!
//! ```rust
//! use emotion_core::signal::RingBuffer;
//!
//! let mut buf = RingBuffer::new(4);
//! buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]); // 5 items → capacity 4 → oldest dropped
//! assert_eq!(buf.get(0), Some(2.0));
//! assert_eq!(buf.drain(), vec![2.0, 3.0, 4.0, 5.0]);
//! ```

// ---------------------------------------------------------------------------
// RingBuffer
// ---------------------------------------------------------------------------

/// A fixed-capacity circular buffer.
///
/// Generic over `T: Copy + Default`; the detectors use `RingBuffer<f32>`.
///
/// ## Overflow behaviour
///
/// When [`push`](Self::push) would exceed `capacity`, the oldest value is
/// silently overwritten.  The buffer never allocates beyond its initial
/// capacity.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: Vec<T>,
    capacity: usize,
    /// Index of the *next* write position (wraps around `capacity`).
    write_pos: usize,
    /// Number of valid values currently stored (≤ `capacity`).
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a new ring buffer with the given `capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        Self {
            buf: vec![T::default(); capacity],
            capacity,
            write_pos: 0,
            len: 0,
        }
    }

    /// Append a single value, evicting the oldest one when full.
    pub fn push(&mut self, item: T) {
        self.buf[self.write_pos] = item;
        self.write_pos = (self.write_pos + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    /// Append `data` in order.
    pub fn push_slice(&mut self, data: &[T]) {
        for &item in data {
            self.push(item);
        }
    }

    /// Value at chronological position `index` (0 = oldest).
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        Some(self.buf[(self.read_pos() + index) % self.capacity])
    }

    /// Oldest stored value.
    pub fn first(&self) -> Option<T> {
        self.get(0)
    }

    /// Newest stored value.
    pub fn last(&self) -> Option<T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate over stored values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(move |i| self.buf[(self.read_pos() + i) % self.capacity])
    }

    /// Drain all stored values in chronological order and reset the buffer.
    pub fn drain(&mut self) -> Vec<T> {
        let result: Vec<T> = self.iter().collect();
        self.clear();
        result
    }

    /// Discard all values and reset the write position.
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Number of valid values currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the buffer contains no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of values the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` when the next push would evict the oldest value.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    // When the buffer has never been fully filled, valid data starts at 0.
    // Once full, the oldest value sits at `write_pos`.
    fn read_pos(&self) -> usize {
        if self.len < self.capacity {
            0
        } else {
            self.write_pos
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_within_capacity_keeps_order() {
        let mut buf = RingBuffer::new(6);
        buf.push_slice(&[0.3_f32, 0.2, 0.1]);
        assert_eq!(buf.len(), 3);
        assert!(!buf.is_full());
        assert_eq!(buf.first(), Some(0.3));
        assert_eq!(buf.last(), Some(0.1));
        assert_eq!(buf.get(3), None);
    }

    #[test]
    fn overflow_evicts_oldest() {
        let mut buf = RingBuffer::new(3);
        buf.push_slice(&[1.0_f32, 2.0, 3.0]);
        buf.push(4.0);
        buf.push(5.0);

        assert_eq!(buf.len(), 3);
        assert!(buf.is_full());
        assert_eq!(buf.iter().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(buf.get(1), Some(4.0));
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut buf = RingBuffer::new(6);
        for i in 0..100 {
            buf.push(i as f32);
            assert!(buf.len() <= 6);
        }
        assert_eq!(buf.first(), Some(94.0));
        assert_eq!(buf.last(), Some(99.0));
    }

    #[test]
    fn drain_and_clear_reset_state() {
        let mut buf = RingBuffer::new(4);
        buf.push_slice(&[1.0_f32, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(buf.drain(), vec![2.0, 3.0, 4.0, 5.0]);
        assert!(buf.is_empty());

        buf.push(9.0);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.last(), None);
    }

    #[test]
    #[should_panic(expected = "RingBuffer capacity must be > 0")]
    fn zero_capacity_panics() {
        let _buf: RingBuffer<f32> = RingBuffer::new(0);
    }
}
