//! Game-session snapshot shared with the presentation layer.
//!
//! [`GameSnapshot`] is a plain copy of everything a consumer needs to draw
//! the rhythm game: score, playback progress, per-slot outcomes, and whether
//! the session has ended or is waiting for a retry.
//!
//! [`SharedSnapshot`] is `Arc<Mutex<GameSnapshot>>`.  The game loop replaces
//! the whole snapshot each tick; readers clone it out and release the lock.

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// Coarse phase of a rhythm-game session.
///
/// ```text
/// Ready ──start_game──▶ Playing ──all slots, enough hits──▶ Finished
///                              ──all slots, too few hits──▶ AwaitingRetry ──retry──▶ Playing
/// Playing / AwaitingRetry ──stop──▶ Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    Ready,
    Playing,
    AwaitingRetry,
    Finished,
}

impl GamePhase {
    /// `true` while the tick timer should keep running.
    ///
    /// ```
    /// use emotion_core::game::GamePhase;
    ///
    /// assert!(!GamePhase::Ready.is_active());
    /// assert!(GamePhase::Playing.is_active());
    /// assert!(GamePhase::AwaitingRetry.is_active());
    /// assert!(!GamePhase::Finished.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::AwaitingRetry)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GamePhase::Ready => "Ready",
            GamePhase::Playing => "Playing",
            GamePhase::AwaitingRetry => "Retry?",
            GamePhase::Finished => "Done",
        }
    }
}

// ---------------------------------------------------------------------------
// GameSnapshot
// ---------------------------------------------------------------------------

/// Point-in-time view of a rhythm-game session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub score: u32,
    /// Playback progress in `[0, 1]`.
    pub progress: f64,
    /// One entry per schedule slot; `true` once a clap was credited to it.
    pub outcomes: Vec<bool>,
    /// Index of the next slot to be judged; equals `outcomes.len()` when done.
    pub current_slot: usize,
    pub terminal: bool,
    pub retry_available: bool,
}

// ---------------------------------------------------------------------------
// SharedSnapshot
// ---------------------------------------------------------------------------

/// Thread-safe handle to the latest [`GameSnapshot`].
///
/// Do not hold the lock across `.await` points.
pub type SharedSnapshot = Arc<Mutex<GameSnapshot>>;

pub fn new_shared_snapshot() -> SharedSnapshot {
    Arc::new(Mutex::new(GameSnapshot::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
