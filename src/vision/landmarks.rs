//! Hand landmark types delivered by the camera pipeline.
//!
//! Coordinates are normalized to `[0, 1] × [0, 1]` image space.  Landmark
//! extraction itself (pose estimation on pixel buffers) happens upstream;
//! this crate only sees the two points per hand the clap detector needs.

/// A point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A tracked point plus the tracker's confidence in it (`0.0`–`1.0`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub location: Point,
    pub confidence: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self {
            location: Point::new(x, y),
            confidence,
        }
    }
}

/// Wrist and little-finger tip of one detected hand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandObservation {
    pub wrist: Landmark,
    pub fingertip: Landmark,
}

impl HandObservation {
    pub fn new(wrist: Landmark, fingertip: Landmark) -> Self {
        Self { wrist, fingertip }
    }

    /// Both landmarks reach `min_confidence`.
    pub fn is_confident(&self, min_confidence: f32) -> bool {
        self.wrist.confidence >= min_confidence && self.fingertip.confidence >= min_confidence
    }
}

/// All hands observed in one camera frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandFrame {
    pub hands: Vec<HandObservation>,
}

impl HandFrame {
    pub fn new(hands: Vec<HandObservation>) -> Self {
        Self { hands }
    }

    /// Both hands when the frame holds exactly two confident observations.
    pub fn confident_pair(&self, min_confidence: f32) -> Option<(&HandObservation, &HandObservation)> {
        match self.hands.as_slice() {
            [a, b] if a.is_confident(min_confidence) && b.is_confident(min_confidence) => {
                Some((a, b))
            }
            _ => None,
        }
    }
}
