//! Maintenance operations on the progress store: statistics, inspection, manual stage
//! changes and resets. None of these run as part of a scheduling pass.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::db::{ProgressMap, ProgressRecord, ProgressStore, StoreError};
use crate::services::interval::IntervalModel;
use crate::services::review_state::ReviewPhase;
use crate::services::scheduler::{review_date_after, ScheduleError};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("no progress recorded for {0:?}")]
    UnknownWord(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    pub total_records: usize,
    /// Records at stage 0.
    pub unlearned: usize,
    /// Records presented at least once, graduated ones included.
    pub learned: usize,
    pub graduated: usize,
    /// Learning-phase records due on or before the given day.
    pub due_today: usize,
    pub stage_distribution: BTreeMap<u32, usize>,
    pub vocabulary_size: usize,
    /// Vocabulary words that have never been presented.
    pub never_presented: usize,
}

impl ProgressStats {
    pub fn learned_ratio(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        self.learned as f64 / self.total_records as f64
    }
}

pub fn compute_stats(
    progress: &ProgressMap,
    vocabulary: &[String],
    today: NaiveDate,
    max_stages: u32,
) -> ProgressStats {
    let mut stats = ProgressStats {
        total_records: progress.len(),
        vocabulary_size: vocabulary.len(),
        ..Default::default()
    };

    for record in progress.values() {
        *stats.stage_distribution.entry(record.stage).or_insert(0) += 1;
        match ReviewPhase::of(record.stage, max_stages) {
            ReviewPhase::New => stats.unlearned += 1,
            ReviewPhase::Learning => {
                stats.learned += 1;
                if record.is_due(today) {
                    stats.due_today += 1;
                }
            }
            ReviewPhase::Graduated => {
                stats.learned += 1;
                stats.graduated += 1;
            }
        }
    }

    stats.never_presented = vocabulary
        .iter()
        .filter(|word| progress.get(word.as_str()).map_or(true, |r| !r.is_presented()))
        .count();

    stats
}

pub fn inspect<S: ProgressStore>(store: &S, word: &str) -> Result<ProgressRecord, AdminError> {
    store
        .get(word)
        .ok_or_else(|| AdminError::UnknownWord(word.to_string()))
}

/// Sets a word's stage by hand.
///
/// Stage 0 resets the word so it is offered as new again. Any other stage schedules the next
/// review as if the word had just been presented at `stage - 1`. Words without a record are
/// created. Returns the stored record, or `None` after a reset.
pub fn set_stage<S: ProgressStore>(
    store: &mut S,
    word: &str,
    stage: u32,
    today: NaiveDate,
    intervals: &mut IntervalModel,
) -> Result<Option<ProgressRecord>, AdminError> {
    if stage == 0 {
        store.remove(word)?;
        info!(word, "word reset to new");
        return Ok(None);
    }

    let mut record = store
        .get(word)
        .unwrap_or_else(|| ProgressRecord::new(word, today));
    let interval = intervals.next_interval(stage - 1);
    let next_review = review_date_after(word, today, interval)?;

    record.stage = stage;
    record.first_seen.get_or_insert(today);
    record.last_review = Some(today);
    record.next_review = Some(next_review);

    store.upsert(record.clone())?;
    info!(word, stage, interval_days = interval, "stage set manually");
    Ok(Some(record))
}

/// Drops all progress for `word`; it will be offered as new again.
pub fn reset_word<S: ProgressStore>(
    store: &mut S,
    word: &str,
) -> Result<ProgressRecord, AdminError> {
    let removed = store
        .remove(word)?
        .ok_or_else(|| AdminError::UnknownWord(word.to_string()))?;
    info!(word, previous_stage = removed.stage, "word reset");
    Ok(removed)
}
