//! Calm-down counting exercise: say the numbers one to ten in order.
//!
//! Speech recognition runs upstream; the tracker receives transcribed words.
//! A spoken number is accepted when it follows the last accepted number or
//! restarts the count at one.  Each accepted number within `1..=target` is
//! marked once; the exercise completes when every number has been marked.

use std::collections::BTreeSet;

use crate::config::CountingConfig;

const WORDS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Parse a spoken number word or digit string (`"three"`, `"3"`).
pub fn parse_number(token: &str) -> Option<u32> {
    let token = token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if let Some(i) = WORDS.iter().position(|w| *w == token) {
        return Some(i as u32 + 1);
    }
    match token.parse::<u32>() {
        Ok(n) if (1..=10).contains(&n) => Some(n),
        _ => None,
    }
}

/// Result of hearing one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountStep {
    /// Not a number, or out of sequence.
    Ignored,
    /// Accepted in sequence; `new` is `false` if it was already marked.
    Counted { number: u32, new: bool },
    /// This number completed the exercise.
    Complete,
}

#[derive(Debug, Clone)]
pub struct CountingTracker {
    target: u32,
    last: u32,
    counted: BTreeSet<u32>,
}

impl CountingTracker {
    pub fn new(target: u32) -> Self {
        Self {
            target: target.clamp(1, WORDS.len() as u32),
            last: 0,
            counted: BTreeSet::new(),
        }
    }

    pub fn from_config(config: &CountingConfig) -> Self {
        Self::new(config.target)
    }

    /// Feed one transcribed word.
    pub fn hear(&mut self, token: &str) -> CountStep {
        if self.is_complete() {
            return CountStep::Ignored;
        }
        let Some(n) = parse_number(token) else {
            return CountStep::Ignored;
        };
        if n != self.last + 1 && n != 1 {
            log::debug!("counting: {n} out of sequence after {}", self.last);
            return CountStep::Ignored;
        }
        self.last = n;

        if n > self.target {
            return CountStep::Ignored;
        }
        let new = self.counted.insert(n);
        if new && self.is_complete() {
            log::info!("counting: reached {}", self.target);
            return CountStep::Complete;
        }
        CountStep::Counted { number: n, new }
    }

    /// Feed every word of a transcribed phrase; returns the last step that
    /// was not [`CountStep::Ignored`].
    pub fn hear_phrase(&mut self, phrase: &str) -> CountStep {
        phrase
            .split_whitespace()
            .map(|word| self.hear(word))
            .filter(|step| *step != CountStep::Ignored)
            .last()
            .unwrap_or(CountStep::Ignored)
    }

    pub fn is_counted(&self, n: u32) -> bool {
        self.counted.contains(&n)
    }

    pub fn counted(&self) -> impl Iterator<Item = u32> + '_ {
        self.counted.iter().copied()
    }

    pub fn last_number(&self) -> u32 {
        self.last
    }

    pub fn is_complete(&self) -> bool {
        self.counted.len() as u32 == self.target
    }

    pub fn reset(&mut self) {
        self.last = 0;
        self.counted.clear();
    }
}

impl Default for CountingTracker {
    fn default() -> Self {
        Self::from_config(&CountingConfig::default())
    }
}
