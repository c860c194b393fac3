//! Audio side: microphone capture → breath detection.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → detector thread
//!           → stereo_to_mono → BreathDetector → DetectorEvent::Breath
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use emotion_core::audio::{BreathDetector, MicrophoneSource};
//! use emotion_core::config::BreathConfig;
//! use emotion_core::events::event_channel;
//! use emotion_core::sensor::SensorMonitor;
//! use emotion_core::signal::MonotonicClock;
//!
//! let (tx, mut rx) = event_channel(32);
//! let detector = BreathDetector::new(BreathConfig::default(), Arc::new(MonotonicClock::start()))
//!     .with_sink(tx);
//! let mut monitor = SensorMonitor::new("breath", MicrophoneSource::new(), detector);
//! monitor.start().unwrap();
//!
//! while let Some(event) = rx.blocking_recv() {
//!     println!("{} at {:?}", event.label(), event.at());
//! }
//! ```

pub mod breath;
pub mod capture;
pub mod mix;

pub use breath::BreathDetector;
pub use capture::{AudioChunk, MicrophoneSource};
pub use mix::stereo_to_mono;
