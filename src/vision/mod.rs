//! Camera side: hand landmarks and facial blend shapes.
//!
//! Pose estimation runs upstream; frames reach this module already reduced to
//! landmark coordinates ([`HandFrame`]) or blend-shape intensities
//! ([`ExpressionSignals`]).  Frames are delivered through
//! [`ExternalSource`](crate::sensor::ExternalSource) so the same
//! [`SensorMonitor`](crate::sensor::SensorMonitor) lifecycle applies as for
//! the microphone.

pub mod clap;
pub mod expression;
pub mod landmarks;

pub use clap::ClapDetector;
pub use expression::{
    BlendShape, CaptureState, Checklist, ChecklistItem, Criterion, Emotion, EmotionCriteria,
    ExpressionClassifier, ExpressionFrame, ExpressionSignals,
};
pub use landmarks::{HandFrame, HandObservation, Landmark, Point};
