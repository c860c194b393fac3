//! Game loop: drives [`RhythmGame`] from a tokio interval and the detector
//! event channel.
//!
//! # Loop
//!
//! ```text
//! GameCommand::Retry   ──▶ retry() ──▶ elapsed restarts at zero
//! GameCommand::Stop    ──▶ stop()  ──▶ return GameOutcome::Stopped
//! DetectorEvent::Clap  ──▶ register_clap()         (latched until credited)
//! interval (0.1 s)     ──▶ tick(elapsed) ──▶ SharedSnapshot
//!                                         └─▶ terminal → return outcome
//! event channel closed ─▶ stop() ──▶ return GameOutcome::Stopped
//! ```
//!
//! The engine lives entirely inside this task; detectors and the
//! presentation layer only ever reach it through the two channels.  A closed
//! command channel just leaves the session without retry/stop control.

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::events::DetectorEvent;

use super::rhythm::{GameOutcome, RhythmGame};
use super::state::SharedSnapshot;

/// Player request forwarded to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    /// Restart after a failed round; ignored unless a retry is offered.
    Retry,
    Stop,
}

/// Owns a [`RhythmGame`] for one session and runs it to completion.
///
/// ```rust,no_run
/// use emotion_core::config::AppConfig;
/// use emotion_core::events::event_channel;
/// use emotion_core::game::{
///     new_shared_snapshot, GameCommand, GameOrchestrator, RhythmGame, SilentPlayback,
/// };
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let game = RhythmGame::from_config(&config, Box::new(SilentPlayback::new()));
/// let snapshot = new_shared_snapshot();
///
/// let (tx, rx) = event_channel(32);
/// let (cmd_tx, cmd_rx) = tokio::sync::mpsc::channel::<GameCommand>(4);
/// // hand `tx` to the ClapDetector, `cmd_tx` to the retry / stop buttons ...
/// let outcome = GameOrchestrator::new(game, snapshot.clone()).run(rx, cmd_rx).await;
/// println!("{outcome:?}, score {}", snapshot.lock().unwrap().score);
/// # drop((tx, cmd_tx));
/// # }
/// ```
pub struct GameOrchestrator {
    game: RhythmGame,
    snapshot: SharedSnapshot,
}

impl GameOrchestrator {
    pub fn new(game: RhythmGame, snapshot: SharedSnapshot) -> Self {
        Self { game, snapshot }
    }

    /// Start the game and run it until it terminates, is stopped, or
    /// `events` closes.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<DetectorEvent>,
        mut commands: mpsc::Receiver<GameCommand>,
    ) -> GameOutcome {
        self.game.start_game();
        let mut started = Instant::now();
        let mut ticker = time::interval(self.game.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;
        self.publish();

        loop {
            tokio::select! {
                biased;

                command = commands.recv(), if commands_open => match command {
                    Some(GameCommand::Retry) => {
                        if self.game.retry() {
                            started = Instant::now();
                            ticker.reset();
                            self.publish();
                        } else {
                            log::debug!("game: retry ignored in {:?}", self.game.phase());
                        }
                    }
                    Some(GameCommand::Stop) => {
                        log::info!("game: stop requested");
                        self.game.stop();
                        self.publish();
                        return GameOutcome::Stopped;
                    }
                    None => commands_open = false,
                },

                event = events.recv() => match event {
                    Some(DetectorEvent::Clap { .. }) => self.game.register_clap(),
                    Some(other) => {
                        log::debug!("game: ignoring {} event", other.label());
                    }
                    None => {
                        log::info!("game: event channel closed, stopping");
                        self.game.stop();
                        self.publish();
                        return GameOutcome::Stopped;
                    }
                },

                _ = ticker.tick() => {
                    let elapsed = started.elapsed().as_secs_f64();
                    let outcome = self.game.tick(elapsed, false);
                    self.publish();
                    if let Some(outcome) = outcome {
                        return outcome;
                    }
                }
            }
        }
    }

    fn publish(&self) {
        let snap = self.game.snapshot();
        let mut shared = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        *shared = snap;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::RhythmConfig;
    use crate::events::event_channel;
    use crate::game::{new_shared_snapshot, GamePhase, SilentPlayback};

    fn command_channel() -> (mpsc::Sender<GameCommand>, mpsc::Receiver<GameCommand>) {
        mpsc::channel(4)
    }

    fn short_game() -> RhythmGame {
        let config = RhythmConfig {
            schedule: vec![0.3, 0.6],
            tolerance_secs: 0.2,
            fallback_duration_secs: 1.0,
            ..RhythmConfig::default()
        };
        RhythmGame::new(config, false, Box::new(SilentPlayback::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn claps_from_channel_complete_the_game() {
        let (tx, rx) = event_channel(8);
        let snapshot = new_shared_snapshot();

        let clapper = tx.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(350)).await;
            clapper.emit(DetectorEvent::Clap { at: Duration::from_millis(350) });
            time::sleep(Duration::from_millis(300)).await;
            clapper.emit(DetectorEvent::Clap { at: Duration::from_millis(650) });
        });

        let (_cmd_tx, cmd_rx) = command_channel();
        let outcome = GameOrchestrator::new(short_game(), snapshot.clone())
            .run(rx, cmd_rx)
            .await;
        assert_eq!(outcome, GameOutcome::Completed { score: 2 });

        let snap = snapshot.lock().unwrap().clone();
        assert!(snap.terminal);
        assert_eq!(snap.outcomes, vec![true, true]);
        assert_eq!(snap.phase, GamePhase::Finished);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_channel_stops_the_game() {
        let (tx, rx) = event_channel(8);
        drop(tx);
        let snapshot = new_shared_snapshot();

        let (_cmd_tx, cmd_rx) = command_channel();
        let outcome = GameOrchestrator::new(short_game(), snapshot.clone())
            .run(rx, cmd_rx)
            .await;
        assert_eq!(outcome, GameOutcome::Stopped);
        assert!(snapshot.lock().unwrap().terminal);
    }

    #[tokio::test(start_paused = true)]
    async fn missed_game_waits_for_retry() {
        let (tx, rx) = event_channel(8);
        let snapshot = new_shared_snapshot();
        tx.emit(DetectorEvent::Breath { at: Duration::from_millis(300) });

        let (_cmd_tx, cmd_rx) = command_channel();
        let run = GameOrchestrator::new(short_game(), snapshot.clone()).run(rx, cmd_rx);
        let result = time::timeout(Duration::from_secs(2), run).await;
        assert!(result.is_err(), "game must keep running while retry is offered");

        let snap = snapshot.lock().unwrap().clone();
        assert!(snap.retry_available);
        assert!(!snap.terminal);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.current_slot, 2);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_round_can_be_retried() {
        let (tx, rx) = event_channel(8);
        let (cmd_tx, cmd_rx) = command_channel();
        let snapshot = new_shared_snapshot();

        // Sit out the first round, then retry and hit both slots of the
        // second one, measured from the retry.
        let clapper = tx.clone();
        let observed = snapshot.clone();
        let player = tokio::spawn(async move {
            time::sleep(Duration::from_millis(1_500)).await;
            let offered = observed.lock().unwrap().retry_available;
            cmd_tx.send(GameCommand::Retry).await.unwrap();
            time::sleep(Duration::from_millis(350)).await;
            clapper.emit(DetectorEvent::Clap { at: Duration::from_millis(1_850) });
            time::sleep(Duration::from_millis(300)).await;
            clapper.emit(DetectorEvent::Clap { at: Duration::from_millis(2_150) });
            offered
        });

        let outcome = GameOrchestrator::new(short_game(), snapshot.clone())
            .run(rx, cmd_rx)
            .await;
        assert_eq!(outcome, GameOutcome::Completed { score: 2 });
        assert!(player.await.unwrap(), "retry must be offered after the failed round");

        let snap = snapshot.lock().unwrap().clone();
        assert_eq!(snap.outcomes, vec![true, true]);
        assert!(!snap.retry_available);
        assert_eq!(snap.phase, GamePhase::Finished);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_while_playing_is_ignored() {
        let (tx, rx) = event_channel(8);
        let (cmd_tx, cmd_rx) = command_channel();
        cmd_tx.send(GameCommand::Retry).await.unwrap();
        drop(cmd_tx);
        let snapshot = new_shared_snapshot();

        let clapper = tx.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(350)).await;
            clapper.emit(DetectorEvent::Clap { at: Duration::from_millis(350) });
            time::sleep(Duration::from_millis(300)).await;
            clapper.emit(DetectorEvent::Clap { at: Duration::from_millis(650) });
        });

        let outcome = GameOrchestrator::new(short_game(), snapshot.clone())
            .run(rx, cmd_rx)
            .await;
        assert_eq!(outcome, GameOutcome::Completed { score: 2 });
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_command_ends_the_session() {
        let (tx, rx) = event_channel(8);
        let (cmd_tx, cmd_rx) = command_channel();
        let snapshot = new_shared_snapshot();

        tokio::spawn(async move {
            time::sleep(Duration::from_millis(250)).await;
            cmd_tx.send(GameCommand::Stop).await.unwrap();
        });

        let outcome = GameOrchestrator::new(short_game(), snapshot.clone())
            .run(rx, cmd_rx)
            .await;
        assert_eq!(outcome, GameOutcome::Stopped);

        let snap = snapshot.lock().unwrap().clone();
        assert!(snap.terminal);
        assert_eq!(snap.phase, GamePhase::Finished);
        assert_eq!(snap.score, 0);
        drop(tx);
    }
}
