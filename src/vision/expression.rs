//! Facial-expression classification from blend-shape intensities.
//!
//! Each camera frame delivers a map of named facial movements ("blend
//! shapes") to intensities in `[0, 1]`.  An emotion is recognised when every
//! check in its criteria table passes; each check also drives one checklist
//! item so the UI can show which parts of the face are already right.
//!
//! | Emotion | Check        | Blend shapes                                         | Threshold |
//! |---------|--------------|------------------------------------------------------|-----------|
//! | happy   | happy mouth  | mouthSmile L+R                                       | 0.7       |
//! | happy   | cheek        | cheekSquint L+R                                      | 0.15      |
//! | happy   | eye          | eyeSquint L+R                                        | 0.1       |
//! | angry   | angry mouth  | mouthPucker, or mouthFunnel, or (upperUp L+R and lowerDown L+R) | 0.3 / 0.2 |
//! | angry   | eyebrow      | browDown L+R                                         | 0.3       |
//! | angry   | nose         | noseSneer L+R                                        | 0.2       |
//!
//! Capturing is single-shot: once the expected emotion is captured the
//! classifier stays in [`CaptureState::Capturing`] for the capture cooldown
//! and emits nothing else, however long the expression is held.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ExpressionConfig;
use crate::events::{DetectorEvent, EventSender};
use crate::sensor::FrameDetector;
use crate::signal::SharedClock;

// ---------------------------------------------------------------------------
// Emotion
// ---------------------------------------------------------------------------

/// The emotions the game levels ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Angry,
}

impl Emotion {
    /// Label consumers receive with a capture event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Angry => "angry",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "happy" => Ok(Emotion::Happy),
            "angry" => Ok(Emotion::Angry),
            other => Err(format!("unknown emotion: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// BlendShape / ExpressionSignals
// ---------------------------------------------------------------------------

/// Facial movements the criteria read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendShape {
    MouthSmileLeft,
    MouthSmileRight,
    CheekSquintLeft,
    CheekSquintRight,
    EyeSquintLeft,
    EyeSquintRight,
    MouthPucker,
    MouthFunnel,
    MouthUpperUpLeft,
    MouthUpperUpRight,
    MouthLowerDownLeft,
    MouthLowerDownRight,
    BrowDownLeft,
    BrowDownRight,
    NoseSneerLeft,
    NoseSneerRight,
}

impl BlendShape {
    pub const ALL: [BlendShape; 16] = [
        BlendShape::MouthSmileLeft,
        BlendShape::MouthSmileRight,
        BlendShape::CheekSquintLeft,
        BlendShape::CheekSquintRight,
        BlendShape::EyeSquintLeft,
        BlendShape::EyeSquintRight,
        BlendShape::MouthPucker,
        BlendShape::MouthFunnel,
        BlendShape::MouthUpperUpLeft,
        BlendShape::MouthUpperUpRight,
        BlendShape::MouthLowerDownLeft,
        BlendShape::MouthLowerDownRight,
        BlendShape::BrowDownLeft,
        BlendShape::BrowDownRight,
        BlendShape::NoseSneerLeft,
        BlendShape::NoseSneerRight,
    ];

    /// Name used by face-tracking runtimes (`mouthSmileLeft`, …).
    pub fn as_str(&self) -> &'static str {
        match self {
            BlendShape::MouthSmileLeft => "mouthSmileLeft",
            BlendShape::MouthSmileRight => "mouthSmileRight",
            BlendShape::CheekSquintLeft => "cheekSquintLeft",
            BlendShape::CheekSquintRight => "cheekSquintRight",
            BlendShape::EyeSquintLeft => "eyeSquintLeft",
            BlendShape::EyeSquintRight => "eyeSquintRight",
            BlendShape::MouthPucker => "mouthPucker",
            BlendShape::MouthFunnel => "mouthFunnel",
            BlendShape::MouthUpperUpLeft => "mouthUpperUpLeft",
            BlendShape::MouthUpperUpRight => "mouthUpperUpRight",
            BlendShape::MouthLowerDownLeft => "mouthLowerDownLeft",
            BlendShape::MouthLowerDownRight => "mouthLowerDownRight",
            BlendShape::BrowDownLeft => "browDownLeft",
            BlendShape::BrowDownRight => "browDownRight",
            BlendShape::NoseSneerLeft => "noseSneerLeft",
            BlendShape::NoseSneerRight => "noseSneerRight",
        }
    }
}

impl FromStr for BlendShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlendShape::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("unknown blend shape: {s}"))
    }
}

/// Blend-shape intensities for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionSignals {
    values: HashMap<BlendShape, f32>,
}

impl ExpressionSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, shape: BlendShape, value: f32) -> Self {
        self.set(shape, value);
        self
    }

    pub fn set(&mut self, shape: BlendShape, value: f32) {
        self.values.insert(shape, value);
    }

    pub fn get(&self, shape: BlendShape) -> Option<f32> {
        self.values.get(&shape).copied()
    }

    /// Build from runtime-named intensities, skipping names the criteria
    /// never read.
    pub fn from_named<'a, I>(named: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        named
            .into_iter()
            .filter_map(|(name, v)| name.parse::<BlendShape>().ok().map(|b| (b, v)))
            .collect()
    }
}

impl FromIterator<(BlendShape, f32)> for ExpressionSignals {
    fn from_iter<T: IntoIterator<Item = (BlendShape, f32)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// A threshold rule over blend shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// `primary > threshold` and, when given, `secondary > threshold`.
    /// A missing primary fails; a missing secondary reads as `0.0`.
    Exceeds {
        primary: BlendShape,
        secondary: Option<BlendShape>,
        threshold: f32,
    },
    AnyOf(Vec<Criterion>),
    AllOf(Vec<Criterion>),
}

impl Criterion {
    pub fn single(shape: BlendShape, threshold: f32) -> Self {
        Criterion::Exceeds {
            primary: shape,
            secondary: None,
            threshold,
        }
    }

    pub fn pair(left: BlendShape, right: BlendShape, threshold: f32) -> Self {
        Criterion::Exceeds {
            primary: left,
            secondary: Some(right),
            threshold,
        }
    }

    pub fn meets(&self, signals: &ExpressionSignals) -> bool {
        match self {
            Criterion::Exceeds {
                primary,
                secondary,
                threshold,
            } => {
                let Some(first) = signals.get(*primary) else {
                    return false;
                };
                let second_ok = match secondary {
                    Some(shape) => signals.get(*shape).unwrap_or(0.0) > *threshold,
                    None => true,
                };
                first > *threshold && second_ok
            }
            Criterion::AnyOf(rules) => rules.iter().any(|r| r.meets(signals)),
            Criterion::AllOf(rules) => rules.iter().all(|r| r.meets(signals)),
        }
    }
}

/// Checklist entries shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecklistItem {
    Eyebrow,
    Eye,
    Cheek,
    HappyMouth,
    AngryMouth,
    Nose,
}

/// Per-region pass/fail state, kept across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checklist {
    pub eyebrow: bool,
    pub eye: bool,
    pub cheek: bool,
    pub happy_mouth: bool,
    pub angry_mouth: bool,
    pub nose: bool,
}

impl Checklist {
    pub fn get(&self, item: ChecklistItem) -> bool {
        match item {
            ChecklistItem::Eyebrow => self.eyebrow,
            ChecklistItem::Eye => self.eye,
            ChecklistItem::Cheek => self.cheek,
            ChecklistItem::HappyMouth => self.happy_mouth,
            ChecklistItem::AngryMouth => self.angry_mouth,
            ChecklistItem::Nose => self.nose,
        }
    }

    pub fn set(&mut self, item: ChecklistItem, value: bool) {
        match item {
            ChecklistItem::Eyebrow => self.eyebrow = value,
            ChecklistItem::Eye => self.eye = value,
            ChecklistItem::Cheek => self.cheek = value,
            ChecklistItem::HappyMouth => self.happy_mouth = value,
            ChecklistItem::AngryMouth => self.angry_mouth = value,
            ChecklistItem::Nose => self.nose = value,
        }
    }
}

/// The checks that together define one emotion.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionCriteria {
    pub emotion: Emotion,
    pub checks: Vec<(ChecklistItem, Criterion)>,
}

impl EmotionCriteria {
    pub fn happy(cfg: &ExpressionConfig) -> Self {
        use BlendShape::*;
        Self {
            emotion: Emotion::Happy,
            checks: vec![
                (
                    ChecklistItem::HappyMouth,
                    Criterion::pair(MouthSmileLeft, MouthSmileRight, cfg.smile_threshold),
                ),
                (
                    ChecklistItem::Cheek,
                    Criterion::pair(CheekSquintLeft, CheekSquintRight, cfg.cheek_squint_threshold),
                ),
                (
                    ChecklistItem::Eye,
                    Criterion::pair(EyeSquintLeft, EyeSquintRight, cfg.eye_squint_threshold),
                ),
            ],
        }
    }

    pub fn angry(cfg: &ExpressionConfig) -> Self {
        use BlendShape::*;
        let mouth = Criterion::AnyOf(vec![
            Criterion::single(MouthPucker, cfg.mouth_tension_threshold),
            Criterion::single(MouthFunnel, cfg.mouth_tension_threshold),
            Criterion::AllOf(vec![
                Criterion::pair(MouthUpperUpLeft, MouthUpperUpRight, cfg.mouth_open_threshold),
                Criterion::pair(
                    MouthLowerDownLeft,
                    MouthLowerDownRight,
                    cfg.mouth_open_threshold,
                ),
            ]),
        ]);
        Self {
            emotion: Emotion::Angry,
            checks: vec![
                (ChecklistItem::AngryMouth, mouth),
                (
                    ChecklistItem::Eyebrow,
                    Criterion::pair(BrowDownLeft, BrowDownRight, cfg.brow_down_threshold),
                ),
                (
                    ChecklistItem::Nose,
                    Criterion::pair(NoseSneerLeft, NoseSneerRight, cfg.nose_sneer_threshold),
                ),
            ],
        }
    }

    /// Run every check, recording each result in `checklist`.
    pub fn evaluate(&self, signals: &ExpressionSignals, checklist: &mut Checklist) -> bool {
        let mut all = true;
        for (item, rule) in &self.checks {
            let ok = rule.meets(signals);
            checklist.set(*item, ok);
            all &= ok;
        }
        all
    }
}

// ---------------------------------------------------------------------------
// ExpressionClassifier
// ---------------------------------------------------------------------------

/// Capture guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing,
}

/// One face-tracking update plus the emotion the active level asks for.
#[derive(Debug, Clone, Default)]
pub struct ExpressionFrame {
    pub signals: ExpressionSignals,
    pub expected: Option<Emotion>,
}

/// Criteria-table classifier with single-shot capture.
pub struct ExpressionClassifier {
    /// Evaluated in order; the first full match wins.
    criteria: Vec<EmotionCriteria>,
    checklist: Checklist,
    capturing_until: Option<Duration>,
    /// Time of the latest frame or poll; every time-based answer uses it.
    last_seen: Duration,
    current: Option<Emotion>,
    pending: Option<(Emotion, Duration)>,
    capture_cooldown: Duration,
    confirmation_delay: Duration,
    clock: SharedClock,
    sink: Option<EventSender>,
}

impl ExpressionClassifier {
    pub fn new(config: &ExpressionConfig, clock: SharedClock) -> Self {
        Self::with_criteria(
            vec![EmotionCriteria::angry(config), EmotionCriteria::happy(config)],
            config,
            clock,
        )
    }

    /// Use a custom criteria table (evaluated in the given order).
    pub fn with_criteria(
        criteria: Vec<EmotionCriteria>,
        config: &ExpressionConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            criteria,
            checklist: Checklist::default(),
            capturing_until: None,
            last_seen: Duration::ZERO,
            current: None,
            pending: None,
            capture_cooldown: config.capture_cooldown(),
            confirmation_delay: config.confirmation_delay(),
            clock,
            sink: None,
        }
    }

    /// Post every capture to `sink`.
    pub fn with_sink(mut self, sink: EventSender) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Evaluate one frame, timestamped by the classifier's clock.
    pub fn evaluate(
        &mut self,
        signals: &ExpressionSignals,
        expected: Option<Emotion>,
    ) -> Option<Emotion> {
        let now = self.clock.now();
        self.evaluate_at(signals, expected, now)
    }

    /// Evaluate one frame observed at `now`.
    ///
    /// Returns the captured emotion when this frame triggered a capture.  A
    /// capture needs a full match, `expected` equal to the matched emotion,
    /// and no capture already in progress.
    pub fn evaluate_at(
        &mut self,
        signals: &ExpressionSignals,
        expected: Option<Emotion>,
        now: Duration,
    ) -> Option<Emotion> {
        self.poll_at(now);

        let mut detected = None;
        for criteria in &self.criteria {
            if criteria.evaluate(signals, &mut self.checklist) && detected.is_none() {
                detected = Some(criteria.emotion);
            }
        }

        let emotion = detected?;
        self.confirm_later(emotion, now);

        if expected != Some(emotion) || self.capturing_until.is_some() {
            return None;
        }

        self.capturing_until = Some(now + self.capture_cooldown);
        self.current = Some(emotion);
        log::info!("expression: captured {emotion} at {:.3}s", now.as_secs_f32());
        if let Some(sink) = &self.sink {
            sink.emit(DetectorEvent::ExpressionCaptured { emotion, at: now });
        }
        Some(emotion)
    }

    /// Advance the capture guard and confirmation delay to the classifier's
    /// clock without a frame.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        self.poll_at(now);
    }

    /// Advance the capture guard and confirmation delay to `now` without a
    /// frame.
    pub fn poll_at(&mut self, now: Duration) {
        self.last_seen = self.last_seen.max(now);
        if self.capturing_until.is_some_and(|until| now >= until) {
            self.capturing_until = None;
        }
        if let Some((emotion, due)) = self.pending {
            if now >= due {
                self.current = Some(emotion);
                self.pending = None;
            }
        }
    }

    fn confirm_later(&mut self, emotion: Emotion, now: Duration) {
        match self.pending {
            Some((pending, _)) if pending == emotion => {}
            _ if self.current == Some(emotion) => self.pending = None,
            _ => self.pending = Some((emotion, now + self.confirmation_delay)),
        }
    }

    /// Per-region checklist as of the last evaluated frame.
    pub fn checklist(&self) -> Checklist {
        self.checklist
    }

    /// Emotion published after the confirmation delay (or by a capture).
    pub fn current_emotion(&self) -> Option<Emotion> {
        self.current
    }

    /// Capture guard as of the latest evaluated frame or poll.
    pub fn capture_state(&self) -> CaptureState {
        self.capture_state_at(self.last_seen)
    }

    /// Capture guard as it stands at `now`, without mutating state.
    pub fn capture_state_at(&self, now: Duration) -> CaptureState {
        match self.capturing_until {
            Some(until) if now < until => CaptureState::Capturing,
            _ => CaptureState::Idle,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capture_state() == CaptureState::Capturing
    }

    /// Re-arm capturing immediately.
    pub fn clear_capture(&mut self) {
        self.capturing_until = None;
    }

    /// Start a new detection episode.
    pub fn reset(&mut self) {
        self.checklist = Checklist::default();
        self.capturing_until = None;
        self.last_seen = Duration::ZERO;
        self.current = None;
        self.pending = None;
    }
}

impl FrameDetector for ExpressionClassifier {
    type Frame = ExpressionFrame;

    fn feed_frame(&mut self, frame: &ExpressionFrame) -> bool {
        self.evaluate(&frame.signals, frame.expected).is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::event_channel;
    use crate::signal::ManualClock;
    use super::BlendShape::*;

    fn classifier() -> (ExpressionClassifier, ManualClock) {
        let clock = ManualClock::new();
        let c = ExpressionClassifier::new(&ExpressionConfig::default(), Arc::new(clock.clone()));
        (c, clock)
    }

    fn happy_face() -> ExpressionSignals {
        ExpressionSignals::new()
            .with(MouthSmileLeft, 0.9)
            .with(MouthSmileRight, 0.85)
            .with(CheekSquintLeft, 0.3)
            .with(CheekSquintRight, 0.3)
            .with(EyeSquintLeft, 0.2)
            .with(EyeSquintRight, 0.2)
    }

    fn angry_face() -> ExpressionSignals {
        ExpressionSignals::new()
            .with(MouthPucker, 0.4)
            .with(BrowDownLeft, 0.5)
            .with(BrowDownRight, 0.5)
            .with(NoseSneerLeft, 0.3)
            .with(NoseSneerRight, 0.3)
    }

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn criterion_pair_needs_both_sides() {
        let rule = Criterion::pair(BrowDownLeft, BrowDownRight, 0.3);
        let one_side = ExpressionSignals::new().with(BrowDownLeft, 0.9);
        assert!(!rule.meets(&one_side));
        assert!(rule.meets(&one_side.with(BrowDownRight, 0.31)));
    }

    #[test]
    fn criterion_threshold_is_strict() {
        let rule = Criterion::single(MouthFunnel, 0.3);
        assert!(!rule.meets(&ExpressionSignals::new().with(MouthFunnel, 0.3)));
        assert!(!rule.meets(&ExpressionSignals::new()));
    }

    #[test]
    fn happy_face_captures_on_happy_level() {
        let (mut c, _) = classifier();
        assert_eq!(
            c.evaluate_at(&happy_face(), Some(Emotion::Happy), secs(0.0)),
            Some(Emotion::Happy)
        );
        let list = c.checklist();
        assert!(list.happy_mouth && list.cheek && list.eye);
        assert!(!list.eyebrow && !list.nose && !list.angry_mouth);
    }

    #[test]
    fn happy_face_on_angry_level_does_not_capture() {
        let (mut c, _) = classifier();
        assert_eq!(c.evaluate_at(&happy_face(), Some(Emotion::Angry), secs(0.0)), None);
        assert_eq!(c.evaluate_at(&happy_face(), None, secs(0.1)), None);
    }

    #[test]
    fn angry_mouth_alternatives() {
        let (mut c, _) = classifier();
        let base = ExpressionSignals::new()
            .with(BrowDownLeft, 0.5)
            .with(BrowDownRight, 0.5)
            .with(NoseSneerLeft, 0.3)
            .with(NoseSneerRight, 0.3);

        let open_mouth = base
            .clone()
            .with(MouthUpperUpLeft, 0.25)
            .with(MouthUpperUpRight, 0.25)
            .with(MouthLowerDownLeft, 0.25)
            .with(MouthLowerDownRight, 0.25);
        assert_eq!(
            c.evaluate_at(&open_mouth, Some(Emotion::Angry), secs(0.0)),
            Some(Emotion::Angry)
        );

        c.reset();
        let half_open = base
            .clone()
            .with(MouthUpperUpLeft, 0.25)
            .with(MouthUpperUpRight, 0.25);
        assert_eq!(c.evaluate_at(&half_open, Some(Emotion::Angry), secs(5.0)), None);
        assert!(!c.checklist().angry_mouth);
        assert!(c.checklist().eyebrow && c.checklist().nose);

        let funnel = base.with(MouthFunnel, 0.35);
        assert_eq!(
            c.evaluate_at(&funnel, Some(Emotion::Angry), secs(5.1)),
            Some(Emotion::Angry)
        );
    }

    #[test]
    fn sustained_expression_captures_once_per_episode() {
        let (tx, mut rx) = event_channel(8);
        let (c, _) = classifier();
        let mut c = c.with_sink(tx);

        let mut captures = 0;
        for i in 0..30 {
            // 30 fps for one second
            if c
                .evaluate_at(&angry_face(), Some(Emotion::Angry), secs(i as f32 / 30.0))
                .is_some()
            {
                captures += 1;
            }
        }
        assert_eq!(captures, 1);
        assert!(matches!(
            rx.try_recv().unwrap(),
            DetectorEvent::ExpressionCaptured { emotion: Emotion::Angry, .. }
        ));
        assert!(rx.try_recv().is_err());

        // Guard clears after the one-second cooldown.
        assert_eq!(
            c.evaluate_at(&angry_face(), Some(Emotion::Angry), secs(1.0)),
            Some(Emotion::Angry)
        );
    }

    #[test]
    fn capture_state_follows_clock() {
        let (mut c, clock) = classifier();
        clock.set(secs(2.0));
        assert_eq!(c.evaluate(&happy_face(), Some(Emotion::Happy)), Some(Emotion::Happy));
        assert_eq!(c.capture_state(), CaptureState::Capturing);

        clock.set(secs(2.5));
        assert!(c.is_capturing());
        assert_eq!(c.evaluate(&happy_face(), Some(Emotion::Happy)), None);

        clock.set(secs(3.0));
        c.poll();
        assert_eq!(c.capture_state(), CaptureState::Idle);
    }

    #[test]
    fn capture_state_uses_frame_time_not_wall_clock() {
        let (mut c, clock) = classifier();
        // Replaying recorded frames: the clock is far ahead of frame time.
        clock.set(secs(20.0));
        assert_eq!(
            c.evaluate_at(&happy_face(), Some(Emotion::Happy), secs(1.0)),
            Some(Emotion::Happy)
        );
        assert_eq!(c.capture_state(), CaptureState::Capturing);
        assert_eq!(c.capture_state_at(secs(1.5)), CaptureState::Capturing);
        assert_eq!(c.capture_state_at(secs(2.0)), CaptureState::Idle);

        c.evaluate_at(&ExpressionSignals::new(), None, secs(1.5));
        assert!(c.is_capturing());
        c.poll_at(secs(2.0));
        assert!(!c.is_capturing());
    }

    #[test]
    fn clear_capture_rearms_immediately() {
        let (mut c, _) = classifier();
        c.evaluate_at(&happy_face(), Some(Emotion::Happy), secs(0.0));
        c.clear_capture();
        assert_eq!(
            c.evaluate_at(&happy_face(), Some(Emotion::Happy), secs(0.1)),
            Some(Emotion::Happy)
        );
    }

    #[test]
    fn published_emotion_waits_for_confirmation_delay() {
        let (mut c, _) = classifier();
        // No level expects it, so only the confirmation path runs.
        c.evaluate_at(&angry_face(), None, secs(0.0));
        assert_eq!(c.current_emotion(), None);

        c.evaluate_at(&ExpressionSignals::new(), None, secs(0.5));
        assert_eq!(c.current_emotion(), None);

        c.poll_at(secs(1.0));
        assert_eq!(c.current_emotion(), Some(Emotion::Angry));
    }

    #[test]
    fn angry_wins_when_both_match() {
        let (mut c, _) = classifier();
        let mut both = happy_face();
        for (shape, v) in [
            (MouthPucker, 0.4),
            (BrowDownLeft, 0.5),
            (BrowDownRight, 0.5),
            (NoseSneerLeft, 0.3),
            (NoseSneerRight, 0.3),
        ] {
            both.set(shape, v);
        }
        assert_eq!(c.evaluate_at(&both, Some(Emotion::Happy), secs(0.0)), None);
        assert_eq!(
            c.evaluate_at(&both, Some(Emotion::Angry), secs(0.1)),
            Some(Emotion::Angry)
        );
    }

    #[test]
    fn reset_clears_checklist_and_guard() {
        let (mut c, _) = classifier();
        c.evaluate_at(&happy_face(), Some(Emotion::Happy), secs(0.0));
        c.reset();
        assert_eq!(c.checklist(), Checklist::default());
        assert_eq!(c.current_emotion(), None);
        assert_eq!(
            c.evaluate_at(&happy_face(), Some(Emotion::Happy), secs(0.2)),
            Some(Emotion::Happy)
        );
    }

    #[test]
    fn named_signals_parse_known_shapes_only() {
        let s = ExpressionSignals::from_named([("mouthSmileLeft", 0.8), ("jawOpen", 0.4)]);
        assert_eq!(s.get(MouthSmileLeft), Some(0.8));
        assert_eq!("noseSneerRight".parse::<BlendShape>(), Ok(NoseSneerRight));
        assert!("jawOpen".parse::<BlendShape>().is_err());
        assert_eq!("angry".parse::<Emotion>(), Ok(Emotion::Angry));
        assert_eq!(Emotion::Happy.to_string(), "happy");
    }
}
