use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::{ProgressMap, ProgressRecord};
use crate::services::interval::IntervalModel;
use crate::services::review_state::ReviewPhase;

pub const DEFAULT_DAILY_NEW_QUOTA: usize = 20;
pub const DEFAULT_MAX_STAGES: u32 = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("cannot schedule {word:?}: {today} plus {interval_days} days is out of range")]
    DateOutOfRange {
        word: String,
        today: NaiveDate,
        interval_days: u32,
    },
}

/// `today + interval_days`, or an error naming the word when the calendar runs out.
pub fn review_date_after(
    word: &str,
    today: NaiveDate,
    interval_days: u32,
) -> Result<NaiveDate, ScheduleError> {
    today
        .checked_add_days(Days::new(u64::from(interval_days)))
        .ok_or_else(|| ScheduleError::DateOutOfRange {
            word: word.to_string(),
            today,
            interval_days,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// New words introduced per pass, independent of how many reviews are due.
    pub daily_new_quota: usize,
    /// Records at or above this stage are graduated and no longer reviewed.
    pub max_stages: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            daily_new_quota: DEFAULT_DAILY_NEW_QUOTA,
            max_stages: DEFAULT_MAX_STAGES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueItem {
    pub word: String,
    /// Stage before this presentation.
    pub stage: u32,
    pub is_new: bool,
}

impl QueueItem {
    fn new_word(word: &str) -> Self {
        Self {
            word: word.to_string(),
            stage: 0,
            is_new: true,
        }
    }

    fn review(record: &ProgressRecord) -> Self {
        Self {
            word: record.word.clone(),
            stage: record.stage,
            is_new: false,
        }
    }
}

/// Words to present in one pass: new words first, then due reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyQueue {
    items: Vec<QueueItem>,
}

impl StudyQueue {
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn new_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_new).count()
    }

    pub fn review_count(&self) -> usize {
        self.items.len() - self.new_count()
    }

    pub fn words(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.word.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn phase_of(&self, record: &ProgressRecord) -> ReviewPhase {
        ReviewPhase::of(record.stage, self.config.max_stages)
    }

    /// Every learning-phase record whose next review has arrived, earliest first.
    /// The set is never truncated.
    pub fn due_reviews(&self, progress: &ProgressMap, today: NaiveDate) -> Vec<QueueItem> {
        let mut due: Vec<&ProgressRecord> = progress
            .values()
            .filter(|record| self.phase_of(record).is_reviewable() && record.is_due(today))
            .collect();
        due.sort_by_key(|record| record.next_review);
        due.into_iter().map(QueueItem::review).collect()
    }

    /// The first `daily_new_quota` vocabulary words that have never been presented, in
    /// vocabulary order. A stage-0 record (never presented, e.g. after a reset) counts as new.
    pub fn new_words(&self, progress: &ProgressMap, vocabulary: &[String]) -> Vec<QueueItem> {
        vocabulary
            .iter()
            .filter(|word| progress.get(word.as_str()).map_or(true, |r| !r.is_presented()))
            .take(self.config.daily_new_quota)
            .map(|word| QueueItem::new_word(word))
            .collect()
    }

    pub fn select_queue(
        &self,
        progress: &ProgressMap,
        vocabulary: &[String],
        today: NaiveDate,
    ) -> StudyQueue {
        let mut items = self.new_words(progress, vocabulary);
        let new_count = items.len();
        items.extend(self.due_reviews(progress, today));

        debug!(
            %today,
            new_words = new_count,
            due_reviews = items.len() - new_count,
            "study queue selected"
        );

        StudyQueue { items }
    }

    /// Advances every presented word by one stage and schedules its next review.
    ///
    /// A word listed more than once is only advanced once. Returns the updated records in
    /// presentation order. On error `progress` is left unchanged.
    pub fn commit_transitions<S: AsRef<str>>(
        &self,
        progress: &mut ProgressMap,
        presented: &[S],
        today: NaiveDate,
        intervals: &mut IntervalModel,
    ) -> Result<Vec<ProgressRecord>, ScheduleError> {
        let mut seen = HashSet::new();
        let mut updated = Vec::with_capacity(presented.len());

        for word in presented {
            let word = word.as_ref();
            if !seen.insert(word) {
                warn!(word, "word presented twice in one pass, advancing once");
                continue;
            }

            let mut record = progress
                .get(word)
                .cloned()
                .unwrap_or_else(|| ProgressRecord::new(word, today));

            let stage = record.stage;
            let interval = intervals.next_interval(stage);
            let next_review = review_date_after(word, today, interval)?;

            record.first_seen.get_or_insert(today);
            record.last_review = Some(today);
            record.next_review = Some(next_review);
            record.stage = stage.saturating_add(1);

            let from = ReviewPhase::of(stage, self.config.max_stages);
            let to = ReviewPhase::of(record.stage, self.config.max_stages);
            debug_assert!(from.can_transition_to(to), "{word}: {from:?} -> {to:?}");

            debug!(
                word,
                from_stage = stage,
                to_stage = record.stage,
                interval_days = interval,
                phase = to.as_str(),
                "word advanced"
            );
            updated.push(record);
        }

        for record in &updated {
            progress.insert(record.word.clone(), record.clone());
        }
        Ok(updated)
    }
}
