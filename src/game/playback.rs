//! Music playback seam for the rhythm game.
//!
//! The engine only needs to start and stop the track and to know how long
//! it is; decoding and output stay behind the [`Playback`] trait.

use std::time::Duration;

/// Background track controller.
pub trait Playback: Send {
    fn play(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    /// Track length, or `None` when the asset could not report it.
    fn duration(&self) -> Option<Duration>;
}

/// A track that makes no sound; used when no audio output is wired up.
#[derive(Debug, Clone, Default)]
pub struct SilentPlayback {
    playing: bool,
    duration: Option<Duration>,
}

impl SilentPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self {
            playing: false,
            duration: Some(duration),
        }
    }
}

impl Playback for SilentPlayback {
    fn play(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_playback_tracks_state() {
        let mut p = SilentPlayback::with_duration(Duration::from_secs(3));
        assert!(!p.is_playing());
        p.play();
        assert!(p.is_playing());
        p.stop();
        p.stop();
        assert!(!p.is_playing());
        assert_eq!(p.duration(), Some(Duration::from_secs(3)));
        assert_eq!(SilentPlayback::new().duration(), None);
    }
}
