//! Cancellable timed tasks.
//!
//! [`Ticker`] runs a callback on a fixed period inside a tokio task until the
//! callback breaks or the ticker is cancelled/dropped.  [`Countdown`] builds
//! the 3-2-1 pre-activity countdown on top of it.
//!
//! ```text
//! Countdown::start(3, 1s)
//!   t=0s Remaining(3)   t=1s Remaining(2)   t=2s Remaining(1)   t=3s Done
//! ```

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::CountingConfig;

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Repeating callback on a tokio interval.  Dropping it cancels the task.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn on the current runtime.  `on_tick` receives the tick index,
    /// starting at `0` immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(u64) -> ControlFlow<()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut n = 0;
            loop {
                interval.tick().await;
                if on_tick(n).is_break() {
                    break;
                }
                n += 1;
            }
        });
        Self { handle }
    }

    /// Stop future ticks.  A tick already running completes.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Remaining(u32),
    Done,
}

/// Pre-activity countdown.  Cancel it (or drop it) on teardown and no
/// further events are delivered.
#[derive(Debug)]
pub struct Countdown {
    ticker: Ticker,
}

impl Countdown {
    pub fn start(from: u32, step: Duration, events: mpsc::UnboundedSender<CountdownEvent>) -> Self {
        log::debug!("countdown: from {from}, step {step:?}");
        let ticker = Ticker::spawn(step, move |n| {
            let remaining = u64::from(from).saturating_sub(n);
            let event = match remaining {
                0 => CountdownEvent::Done,
                r => CountdownEvent::Remaining(r as u32),
            };
            if events.send(event).is_err() || event == CountdownEvent::Done {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        Self { ticker }
    }

    pub fn from_config(config: &CountingConfig, events: mpsc::UnboundedSender<CountdownEvent>) -> Self {
        let step = Duration::from_secs_f64(config.countdown_step_secs.max(0.0));
        Self::start(config.countdown_from, step, events)
    }

    pub fn cancel(&self) {
        log::debug!("countdown: cancelled");
        self.ticker.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.ticker.is_finished()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
