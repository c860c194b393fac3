//! Sensor-driven detection core for an emotion-education game.
//!
//! Detectors turn raw sensor frames into discrete events; game-side
//! consumers turn events into score and progress.
//!
//! ```text
//! microphone ─▶ BreathDetector ───────┐
//! hand pose  ─▶ ClapDetector ─────────┼─▶ EventSender ─▶ owning loop ─▶ RhythmGame
//! face       ─▶ ExpressionClassifier ─┘                              └─▶ dialogue / levels
//! ```

pub mod audio;
pub mod config;
pub mod events;
pub mod game;
pub mod sensor;
pub mod signal;
pub mod vision;
