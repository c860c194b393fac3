//! Live breath monitor.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults on first run).
//! 3. Create the tokio runtime.
//! 4. Run the 3-2-1 countdown.
//! 5. Start microphone capture feeding a [`BreathDetector`].
//! 6. Log detector events until Ctrl-C, then stop capture.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use emotion_core::{
    audio::{BreathDetector, MicrophoneSource},
    config::AppConfig,
    events::event_channel,
    game::{Countdown, CountdownEvent},
    sensor::SensorMonitor,
    signal::MonotonicClock,
};

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("emotion-core breath monitor starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run(config))
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    // 4. Countdown
    let (count_tx, mut count_rx) = mpsc::unbounded_channel();
    let _countdown = Countdown::from_config(&config.counting, count_tx);
    while let Some(step) = count_rx.recv().await {
        match step {
            CountdownEvent::Remaining(n) => log::info!("{n}..."),
            CountdownEvent::Done => log::info!("blow into the microphone!"),
        }
    }

    // 5. Capture → detector
    let (event_tx, mut event_rx) = event_channel(64);
    let clock = Arc::new(MonotonicClock::start());
    let detector = BreathDetector::new(config.breath.clone(), clock).with_sink(event_tx);
    let mut monitor = SensorMonitor::new("breath", MicrophoneSource::new(), detector);
    monitor.start().context("microphone capture unavailable")?;
    log::info!(
        "capturing at {} Hz, {} ch",
        monitor.source().sample_rate(),
        monitor.source().channels()
    );

    // 6. Owning loop
    let mut breaths = 0u32;
    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(event) => {
                    breaths += 1;
                    log::info!("{} #{breaths} at {:.2}s", event.label(), event.at().as_secs_f32());
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted");
                break;
            }
        }
    }

    monitor.stop();
    log::info!("{breaths} breaths detected");
    Ok(())
}
