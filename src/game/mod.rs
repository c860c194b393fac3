//! Game-side consumers of detector events.
//!
//! * [`RhythmGame`]: clap-along scoring engine, ticked by [`GameOrchestrator`].
//! * [`Countdown`] / [`Ticker`]: cancellable timed tasks.
//! * [`CountingTracker`]: spoken one-to-ten calm-down exercise.

pub mod counting;
pub mod playback;
pub mod rhythm;
pub mod runner;
pub mod scheduler;
pub mod state;

pub use counting::{parse_number, CountStep, CountingTracker};
pub use playback::{Playback, SilentPlayback};
pub use rhythm::{GameOutcome, RhythmGame};
pub use runner::{GameCommand, GameOrchestrator};
pub use scheduler::{Countdown, CountdownEvent, Ticker};
pub use state::{new_shared_snapshot, GamePhase, GameSnapshot, SharedSnapshot};
