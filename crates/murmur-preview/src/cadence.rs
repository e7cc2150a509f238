// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-like typing cadence.
//!
//! Speed is chosen per segment of a few dozen characters: most segments are
//! fast bursts near the top of the configured range, some are slow patches
//! near the bottom. Punctuation and line breaks add a pause on top of the
//! per-character delay, and very long pauses are flagged as "thinking".

use std::time::Duration;

use murmur_config::model::PreviewConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Share of segments typed at burst speed.
const FAST_SEGMENT_PROBABILITY: f64 = 0.75;

/// Chance of an unprompted hesitation at a word boundary.
const HESITATION_PROBABILITY: f64 = 0.02;

/// Delay before revealing one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pause {
    pub delay: Duration,
    /// Long enough that the surface should render a "thinking" ellipsis.
    pub thinking: bool,
}

/// Randomized per-character delay generator.
pub struct Cadence {
    rng: StdRng,
    min_cps: f64,
    max_cps: f64,
    thinking_threshold: Duration,
    segment_cps: f64,
    segment_remaining: usize,
}

impl Cadence {
    pub fn new(config: &PreviewConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic cadence for tests and demos.
    pub fn seeded(config: &PreviewConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &PreviewConfig, rng: StdRng) -> Self {
        let min_cps = config.min_chars_per_sec.max(1.0);
        let max_cps = config.max_chars_per_sec.max(min_cps);
        Self {
            rng,
            min_cps,
            max_cps,
            thinking_threshold: Duration::from_millis(config.thinking_threshold_ms),
            segment_cps: max_cps,
            segment_remaining: 0,
        }
    }

    /// Delay before revealing `next`, given the character revealed before it.
    pub fn pause(&mut self, prev: Option<char>, next: char) -> Pause {
        if self.segment_remaining == 0 {
            self.start_segment();
        }
        self.segment_remaining -= 1;

        let base_ms = 1000.0 / self.segment_cps;
        let extra_ms = match (prev, next) {
            (Some('\n'), '\n') => self.rng.gen_range(300.0..700.0),
            (Some('\n'), _) | (_, '\n') => self.rng.gen_range(120.0..300.0),
            (Some('.' | '!' | '?'), _) => self.rng.gen_range(150.0..450.0),
            (Some(',' | ';' | ':'), _) => self.rng.gen_range(60.0..180.0),
            (Some(' '), _) if self.rng.gen_bool(HESITATION_PROBABILITY) => {
                self.rng.gen_range(500.0..1100.0)
            }
            _ => 0.0,
        };

        let delay = Duration::from_secs_f64((base_ms + extra_ms) / 1000.0);
        Pause {
            delay,
            thinking: delay >= self.thinking_threshold,
        }
    }

    fn start_segment(&mut self) {
        let mid = (self.min_cps + self.max_cps) / 2.0;
        self.segment_cps = if self.max_cps - self.min_cps < f64::EPSILON {
            self.max_cps
        } else if self.rng.gen_bool(FAST_SEGMENT_PROBABILITY) {
            self.rng.gen_range(mid..=self.max_cps)
        } else {
            self.rng.gen_range(self.min_cps..=mid)
        };
        self.segment_remaining = self.rng.gen_range(8..=40);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> PreviewConfig {
        PreviewConfig::default()
    }

    #[test]
    fn plain_letters_stay_within_speed_bounds() {
        let mut cadence = Cadence::seeded(&config(), 7);
        let fastest = Duration::from_secs_f64(1.0 / 125.0);
        let slowest = Duration::from_secs_f64(1.0 / 20.0);
        for _ in 0..500 {
            let pause = cadence.pause(Some('a'), 'b');
            assert!(pause.delay >= fastest - Duration::from_micros(1));
            assert!(pause.delay <= slowest + Duration::from_micros(1));
            assert!(!pause.thinking);
        }
    }

    #[test]
    fn sentence_end_pauses_longer_than_letters() {
        let mut cadence = Cadence::seeded(&config(), 11);
        let after_period = cadence.pause(Some('.'), ' ');
        assert!(after_period.delay >= Duration::from_millis(150));
    }

    #[test]
    fn paragraph_break_can_think() {
        let cfg = PreviewConfig {
            thinking_threshold_ms: 300,
            ..PreviewConfig::default()
        };
        let mut cadence = Cadence::seeded(&cfg, 3);
        let pause = cadence.pause(Some('\n'), '\n');
        assert!(pause.delay >= Duration::from_millis(300));
        assert!(pause.thinking);
    }

    #[test]
    fn seeded_cadence_is_reproducible() {
        let mut a = Cadence::seeded(&config(), 42);
        let mut b = Cadence::seeded(&config(), 42);
        for c in "Hello, world. How are you?".chars() {
            assert_eq!(a.pause(Some(' '), c), b.pause(Some(' '), c));
        }
    }

    #[test]
    fn mostly_fast() {
        let mut cadence = Cadence::seeded(&config(), 99);
        let mid_delay = Duration::from_secs_f64(1.0 / 72.5);
        let fast = (0..4000)
            .filter(|_| cadence.pause(Some('a'), 'a').delay <= mid_delay)
            .count();
        assert!(fast > 2000, "expected a fast bias, got {fast}/4000");
    }

    proptest! {
        #[test]
        fn delays_are_bounded(seed in any::<u64>(), text in "[a-z .,!?\n]{1,64}") {
            let mut cadence = Cadence::seeded(&config(), seed);
            let mut prev = None;
            for c in text.chars() {
                let pause = cadence.pause(prev, c);
                prop_assert!(pause.delay >= Duration::from_millis(7));
                prop_assert!(pause.delay <= Duration::from_millis(1200));
                prev = Some(c);
            }
        }
    }
}
