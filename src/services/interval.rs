//! Forgetting-curve intervals.
//!
//! Stage `s` maps to `BASE_INTERVALS[s]` days, saturating at the last entry. Intervals longer
//! than four days get a symmetric random offset of up to 15% (truncated to whole days, at least
//! one day) so that words learned together drift apart instead of landing on the same future
//! day.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const BASE_INTERVALS: [u32; 9] = [1, 2, 4, 7, 15, 30, 60, 90, 180];

const JITTER_PERCENT: u32 = 15;
const JITTER_MIN_BASE_DAYS: u32 = 4;

pub fn base_interval(stage: u32) -> u32 {
    let last = BASE_INTERVALS[BASE_INTERVALS.len() - 1];
    usize::try_from(stage)
        .ok()
        .and_then(|idx| BASE_INTERVALS.get(idx).copied())
        .unwrap_or(last)
}

/// Largest offset (in days) that may be applied to `base`: 15% rounded down, at least 1.
pub fn jitter_span(base: u32) -> u32 {
    if base <= JITTER_MIN_BASE_DAYS {
        return 0;
    }
    (base.saturating_mul(JITTER_PERCENT) / 100).max(1)
}

/// Computes next-review offsets. The random source is owned by the model so that callers
/// can seed it or switch jitter off entirely.
#[derive(Debug, Clone)]
pub struct IntervalModel {
    rng: Option<StdRng>,
}

impl IntervalModel {
    pub fn from_entropy() -> Self {
        Self {
            rng: Some(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    /// Every interval is exactly its base value.
    pub fn without_jitter() -> Self {
        Self { rng: None }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::from_entropy(),
        }
    }

    /// Days until the next review for a word currently at `stage`. Always at least 1.
    pub fn next_interval(&mut self, stage: u32) -> u32 {
        let base = base_interval(stage);
        let span = i64::from(jitter_span(base));

        let offset = match self.rng.as_mut() {
            Some(rng) if span > 0 => rng.random_range(-span..=span),
            _ => 0,
        };

        u32::try_from((i64::from(base) + offset).max(1)).unwrap_or(1)
    }
}

impl Default for IntervalModel {
    fn default() -> Self {
        Self::from_entropy()
    }
}
