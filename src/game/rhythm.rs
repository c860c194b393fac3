//! Clap-along rhythm game engine.
//!
//! The engine is a pure state machine over the schedule slot index
//! `i ∈ [0, N]`.  It is advanced by [`RhythmGame::tick`] at a fixed cadence
//! (0.1 s) from the owning loop, never concurrently.
//!
//! Per tick, while `i < N` and `target = schedule[i]`:
//!
//! 1. clap this tick and `|elapsed − target| ≤ tolerance` → credit slot `i`,
//!    `score += 1`, `i += 1`;
//! 2. otherwise, `elapsed ≥ target + tolerance` → slot `i` is missed, `i += 1`.
//!
//! The hit check runs first, so a clap landing exactly on
//! `target + tolerance` is still credited.
//!
//! Once `i == N` and playback progress reaches 0.97 the credited slots are
//! counted: `≥ ceil(N/2)` ends the game, fewer leaves it running with a
//! retry offered.

use std::time::Duration;

use crate::config::{AppConfig, RhythmConfig};

use super::playback::Playback;
use super::state::{GamePhase, GameSnapshot};

/// How a session ended; passed to the `on_game_end` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Completed { score: u32 },
    Stopped,
}

type EndCallback = Box<dyn FnMut(GameOutcome) + Send>;

/// Rhythm-game session state plus the track it plays along to.
pub struct RhythmGame {
    config: RhythmConfig,
    sound_enabled: bool,
    playback: Box<dyn Playback>,
    phase: GamePhase,
    outcomes: Vec<bool>,
    slot: usize,
    score: u32,
    elapsed: f64,
    clap_pending: bool,
    claps_blocked_until: Option<f64>,
    on_end: Option<EndCallback>,
}

impl RhythmGame {
    pub fn new(config: RhythmConfig, sound_enabled: bool, playback: Box<dyn Playback>) -> Self {
        Self {
            config,
            sound_enabled,
            playback,
            phase: GamePhase::Ready,
            outcomes: Vec::new(),
            slot: 0,
            score: 0,
            elapsed: 0.0,
            clap_pending: false,
            claps_blocked_until: None,
            on_end: None,
        }
    }

    pub fn from_config(config: &AppConfig, playback: Box<dyn Playback>) -> Self {
        Self::new(config.rhythm.clone(), config.sound_enabled, playback)
    }

    /// Called once when the session terminates (completion or stop).
    pub fn on_game_end(&mut self, callback: impl FnMut(GameOutcome) + Send + 'static) {
        self.on_end = Some(Box::new(callback));
    }

    // -----------------------------------------------------------------------
    // Session control
    // -----------------------------------------------------------------------

    /// Begin a fresh session: new outcome sequence, zeroed counters, music on.
    pub fn start_game(&mut self) {
        if self.playback.is_playing() {
            self.playback.stop();
        }
        self.outcomes = vec![false; self.config.schedule.len()];
        self.reset_game_state();
        self.phase = GamePhase::Playing;
        if self.sound_enabled {
            self.playback.play();
        }
        log::info!(
            "rhythm: started, {} slots, {} needed",
            self.outcomes.len(),
            self.config.required_hits()
        );
    }

    /// Zero score, slot index and timing.  Outcome history is kept until the
    /// next [`start_game`](Self::start_game).
    pub fn reset_game_state(&mut self) {
        self.score = 0;
        self.slot = 0;
        self.elapsed = 0.0;
        self.clap_pending = false;
        self.claps_blocked_until = None;
    }

    /// Restart after a failed attempt.  Returns `false` when no retry is on
    /// offer.
    pub fn retry(&mut self) -> bool {
        if self.phase != GamePhase::AwaitingRetry {
            return false;
        }
        log::info!("rhythm: retry");
        self.start_game();
        true
    }

    /// Force the session to end.  Returns `false` if it was not running.
    pub fn stop(&mut self) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        self.finish(GameOutcome::Stopped);
        true
    }

    /// Latch a clap.  The latch holds until a tick credits it to a slot, so
    /// a clap just before a window opens still counts once it does.  Claps
    /// during the clear delay after a hit are discarded.
    pub fn register_clap(&mut self) {
        if self.phase == GamePhase::Playing {
            self.clap_pending = true;
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the session to `elapsed` seconds since start.
    ///
    /// Returns the outcome on the tick the game terminates.
    pub fn tick(&mut self, elapsed: f64, clap_now: bool) -> Option<GameOutcome> {
        if !self.phase.is_active() {
            self.clap_pending = false;
            return None;
        }
        self.elapsed = elapsed.max(0.0);
        let clap = self.take_clap(clap_now);
        self.check_invariants();

        let n = self.outcomes.len();
        if let Some(&target) = self.config.schedule.get(self.slot) {
            let tolerance = self.config.tolerance_secs;
            if clap && (self.elapsed - target).abs() <= tolerance {
                self.outcomes[self.slot] = true;
                self.score += 1;
                self.clap_pending = false;
                self.claps_blocked_until = Some(self.elapsed + self.config.clap_clear_delay_secs);
                log::debug!("rhythm: slot {} hit at {:.2}s", self.slot, self.elapsed);
                self.slot += 1;
            } else if self.elapsed >= target + tolerance {
                log::debug!("rhythm: slot {} missed", self.slot);
                self.slot += 1;
            }
        }

        if self.slot >= n && self.progress() >= self.config.completion_progress {
            let credited = self.credited();
            if credited >= self.config.required_hits() {
                return Some(self.finish(GameOutcome::Completed { score: self.score }));
            }
            if self.phase == GamePhase::Playing {
                self.phase = GamePhase::AwaitingRetry;
                log::info!("rhythm: {credited}/{n} claps on beat, retry offered");
            }
        }
        None
    }

    fn take_clap(&mut self, clap_now: bool) -> bool {
        match self.claps_blocked_until {
            Some(until) if self.elapsed < until => {
                self.clap_pending = false;
                false
            }
            _ => {
                self.claps_blocked_until = None;
                self.clap_pending || clap_now
            }
        }
    }

    fn check_invariants(&mut self) {
        let n = self.config.schedule.len();
        debug_assert_eq!(self.outcomes.len(), n, "outcome/schedule length mismatch");
        if self.outcomes.len() != n {
            self.outcomes.resize(n, false);
        }
        debug_assert!(self.slot <= n, "slot index past schedule end");
        self.slot = self.slot.min(n);
    }

    fn finish(&mut self, outcome: GameOutcome) -> GameOutcome {
        // Timer first, then audio, then the consumer.
        self.phase = GamePhase::Finished;
        self.clap_pending = false;
        self.playback.stop();
        log::info!("rhythm: ended ({outcome:?})");
        if let Some(callback) = self.on_end.as_mut() {
            callback(outcome);
        }
        outcome
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// `min(elapsed / duration, 1)`, using the fallback duration when the
    /// track cannot report one.
    pub fn progress(&self) -> f64 {
        let duration = self
            .playback
            .duration()
            .map(|d| d.as_secs_f64())
            .filter(|d| *d > 0.0)
            .unwrap_or(self.config.fallback_duration_secs);
        if duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / duration).clamp(0.0, 1.0)
    }

    pub fn credited(&self) -> usize {
        self.outcomes.iter().filter(|hit| **hit).count()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            score: self.score,
            progress: self.progress(),
            outcomes: self.outcomes.clone(),
            current_slot: self.slot,
            terminal: self.phase == GamePhase::Finished,
            retry_available: self.phase == GamePhase::AwaitingRetry,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// `true` while the tick timer should keep firing.
    pub fn is_running(&self) -> bool {
        self.phase.is_active()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_slot(&self) -> usize {
        self.slot
    }

    pub fn outcomes(&self) -> &[bool] {
        &self.outcomes
    }

    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
