//! Detector and game settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to each
//! component at construction.  Every field is `#[serde(default)]`, so a
//! partial `settings.toml` only overrides what it names.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// BreathConfig
// ---------------------------------------------------------------------------

/// Settings for the microphone breath detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathConfig {
    /// Smoothed RMS must be strictly above this to count as a breath.
    pub high_pass_threshold: f32,
    /// Smoothed RMS must be strictly below this (rejects clipping / bangs).
    pub low_pass_threshold: f32,
    /// Fraction of the previous smoothed value kept on every buffer.
    pub smoothing: f32,
    /// Minimum seconds between two emitted breath events.
    pub min_breath_secs: f32,
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            high_pass_threshold: 0.05,
            low_pass_threshold: 1.0,
            smoothing: 0.85,
            min_breath_secs: 0.15,
        }
    }
}

impl BreathConfig {
    pub fn min_breath_interval(&self) -> Duration {
        Duration::from_secs_f32(self.min_breath_secs.max(0.0))
    }
}

// ---------------------------------------------------------------------------
// ClapConfig
// ---------------------------------------------------------------------------

/// Settings for the hand-landmark clap detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClapConfig {
    /// Landmarks below this confidence make the whole frame unusable.
    pub min_confidence: f32,
    /// Number of wrist distances kept for motion analysis.
    pub history_len: usize,
    /// Maximum vertical offset between the wrists (normalized units).
    pub max_vertical_offset: f32,
    /// Maximum `|wrist distance - fingertip distance|`.
    ///
    /// Kept at the historical value of `20` even though distances live in
    /// `[0, 1]`; at that value the check never rejects a frame.
    pub max_span_mismatch: f32,
    /// Minimum drop between the oldest and middle distance.
    pub closing_speed: f32,
    /// Middle distance must be below this.
    pub contact_distance: f32,
    /// Newest distance below this means the hands stayed together.
    pub stays_closed_distance: f32,
    /// Minimum rebound from the middle distance when the hands reopen.
    pub reopen_distance: f32,
    /// Minimum seconds between two emitted claps.
    pub cooldown_secs: f32,
}

impl Default for ClapConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.15,
            history_len: 6,
            max_vertical_offset: 0.5,
            max_span_mismatch: 20.0,
            closing_speed: 0.12,
            contact_distance: 0.15,
            stays_closed_distance: 0.12,
            reopen_distance: 0.03,
            cooldown_secs: 0.4,
        }
    }
}

impl ClapConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldown_secs.max(0.0))
    }
}

// ---------------------------------------------------------------------------
// ExpressionConfig
// ---------------------------------------------------------------------------

/// Blend-shape thresholds for the expression classifier.
///
/// A criterion on a left/right pair passes only when **both** sides are
/// strictly above the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    pub smile_threshold: f32,
    pub cheek_squint_threshold: f32,
    pub eye_squint_threshold: f32,
    pub mouth_tension_threshold: f32,
    pub mouth_open_threshold: f32,
    pub brow_down_threshold: f32,
    pub nose_sneer_threshold: f32,
    /// Seconds the capture guard stays armed after a capture.
    pub capture_cooldown_secs: f32,
    /// Seconds a detection waits before it becomes the published emotion.
    pub confirmation_delay_secs: f32,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            smile_threshold: 0.7,
            cheek_squint_threshold: 0.15,
            eye_squint_threshold: 0.1,
            mouth_tension_threshold: 0.3,
            mouth_open_threshold: 0.2,
            brow_down_threshold: 0.3,
            nose_sneer_threshold: 0.2,
            capture_cooldown_secs: 1.0,
            confirmation_delay_secs: 1.0,
        }
    }
}

impl ExpressionConfig {
    pub fn capture_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.capture_cooldown_secs.max(0.0))
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_secs_f32(self.confirmation_delay_secs.max(0.0))
    }
}

// ---------------------------------------------------------------------------
// RhythmConfig
// ---------------------------------------------------------------------------

/// Settings for the clap-along rhythm game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    /// Expected clap instants, seconds from game start, ascending.
    pub schedule: Vec<f64>,
    /// Half-width of the acceptance window around each instant.
    pub tolerance_secs: f64,
    /// Timer cadence driving the game loop.
    pub tick_secs: f64,
    /// Track length used when the music asset cannot report its duration.
    pub fallback_duration_secs: f64,
    /// Progress (0–1) that must be reached before the game can complete.
    pub completion_progress: f64,
    /// Fraction of slots that must be credited, rounded up.
    pub required_ratio: f64,
    /// Seconds after a credited clap during which further claps are ignored.
    pub clap_clear_delay_secs: f64,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            schedule: vec![0.9, 1.7, 3.1, 4.1, 5.1, 6.2, 6.8, 7.3],
            tolerance_secs: 0.4,
            tick_secs: 0.1,
            fallback_duration_secs: 7.821,
            completion_progress: 0.97,
            required_ratio: 0.5,
            clap_clear_delay_secs: 0.1,
        }
    }
}

impl RhythmConfig {
    /// Number of credited slots needed to win: `ceil(N * required_ratio)`.
    ///
    /// ```
    /// use emotion_core::config::RhythmConfig;
    ///
    /// let cfg = RhythmConfig::default();
    /// assert_eq!(cfg.required_hits(), 4); // ceil(8 / 2)
    /// ```
    pub fn required_hits(&self) -> usize {
        (self.schedule.len() as f64 * self.required_ratio).ceil() as usize
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.tick_secs.max(0.001))
    }
}

// ---------------------------------------------------------------------------
// CountingConfig
// ---------------------------------------------------------------------------

/// Settings for the calm-down counting exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountingConfig {
    /// Count runs from 1 up to and including this number.
    pub target: u32,
    /// Seconds per step of the pre-activity countdown.
    pub countdown_step_secs: f64,
    /// Value the pre-activity countdown starts from.
    pub countdown_from: u32,
}

impl Default for CountingConfig {
    fn default() -> Self {
        Self {
            target: 10,
            countdown_step_secs: 1.0,
            countdown_from: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// `sound_enabled` is the single switch for music playback; it is passed to
/// the rhythm game when the game is built rather than read from global state.
///
/// ```rust,no_run
/// use emotion_core::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// assert!(config.rhythm.tolerance_secs > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Play background music during activities.
    pub sound_enabled: bool,
    pub breath: BreathConfig,
    pub clap: ClapConfig,
    pub expression: ExpressionConfig,
    pub rhythm: RhythmConfig,
    pub counting: CountingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            breath: BreathConfig::default(),
            clap: ClapConfig::default(),
            expression: ExpressionConfig::default(),
            rhythm: RhythmConfig::default(),
            counting: CountingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
