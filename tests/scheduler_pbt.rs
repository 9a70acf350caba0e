//! Property-based tests for queue selection and stage transitions.
//!
//! Covered:
//! - Interval bounds: at least one day, within the jitter span of the base interval
//! - Monotonic stage: committing a word raises its stage by exactly one
//! - Due-set completeness: every due learning record is queued exactly once
//! - Graduation: records at or above the cap are never queued
//! - New-word quota: exactly min(quota, unseen) new words, in vocabulary order

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use danci_review::db::{ProgressMap, ProgressRecord};
use danci_review::services::interval::{base_interval, jitter_span, IntervalModel};
use danci_review::services::scheduler::{Scheduler, SchedulerConfig};

const MAX_STAGES: u32 = 8;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// (stage, days offset of next_review relative to today)
fn arb_entry() -> impl Strategy<Value = (u32, i64)> {
    (0u32..=12u32, -60i64..=60i64)
}

fn arb_progress() -> impl Strategy<Value = ProgressMap> {
    proptest::collection::vec(arb_entry(), 0..40).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(idx, (stage, offset))| {
                let word = format!("w{idx}");
                let next_review = if offset >= 0 {
                    today().checked_add_days(Days::new(offset as u64))
                } else {
                    today().checked_sub_days(Days::new(offset.unsigned_abs()))
                };
                let record = ProgressRecord {
                    word: word.clone(),
                    stage,
                    first_seen: Some(today() - Days::new(100)),
                    last_review: None,
                    next_review,
                };
                (word, record)
            })
            .collect()
    })
}

fn scheduler(daily_new_quota: usize) -> Scheduler {
    Scheduler::new(SchedulerConfig {
        daily_new_quota,
        max_stages: MAX_STAGES,
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_interval_within_jitter_bounds(stage in 0u32..20, seed in any::<u64>()) {
        let mut model = IntervalModel::with_seed(seed);
        let base = base_interval(stage);
        let span = jitter_span(base);

        for _ in 0..20 {
            let interval = model.next_interval(stage);
            prop_assert!(interval >= 1);
            prop_assert!(interval + span >= base);
            prop_assert!(interval <= base + span);
        }
    }

    #[test]
    fn prop_short_intervals_are_exact(stage in 0u32..=2, seed in any::<u64>()) {
        let mut model = IntervalModel::with_seed(seed);
        prop_assert_eq!(model.next_interval(stage), base_interval(stage));
    }

    #[test]
    fn prop_commit_raises_stage_by_one(progress in arb_progress(), seed in any::<u64>()) {
        let scheduler = scheduler(0);
        let words: Vec<String> = progress.keys().cloned().collect();
        let mut after = progress.clone();
        let mut intervals = IntervalModel::with_seed(seed);

        let updated = scheduler
            .commit_transitions(&mut after, &words, today(), &mut intervals)
            .unwrap();
        prop_assert_eq!(updated.len(), words.len());

        for word in &words {
            let before = &progress[word];
            let now = &after[word];
            prop_assert_eq!(now.stage, before.stage + 1);
            prop_assert_eq!(now.last_review, Some(today()));
            prop_assert!(now.next_review.unwrap() > today());
            prop_assert_eq!(now.first_seen, before.first_seen);
        }
    }

    #[test]
    fn prop_due_set_complete_and_unique(progress in arb_progress(), quota in 0usize..5) {
        let scheduler = scheduler(quota);
        let queue = scheduler.select_queue(&progress, &[], today());

        let expected: HashSet<&str> = progress
            .values()
            .filter(|r| r.stage >= 1 && r.stage < MAX_STAGES)
            .filter(|r| r.next_review.map_or(true, |d| d <= today()))
            .map(|r| r.word.as_str())
            .collect();

        let words = queue.words();
        let unique: HashSet<&str> = words.iter().copied().collect();
        prop_assert_eq!(unique.len(), words.len());
        prop_assert_eq!(unique, expected);

        let dates: Vec<_> = queue
            .items()
            .iter()
            .map(|item| progress[&item.word].next_review)
            .collect();
        prop_assert!(dates.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn prop_graduated_never_queued(progress in arb_progress()) {
        let scheduler = scheduler(50);
        let vocabulary: Vec<String> = progress.keys().cloned().collect();
        let queue = scheduler.select_queue(&progress, &vocabulary, today());

        for item in queue.items() {
            prop_assert!(progress[&item.word].stage < MAX_STAGES);
        }
    }

    #[test]
    fn prop_new_word_quota_is_exact(
        progress in arb_progress(),
        extra in 0usize..30,
        quota in 0usize..25,
    ) {
        let scheduler = scheduler(quota);
        let mut vocabulary: Vec<String> = progress.keys().cloned().collect();
        vocabulary.extend((0..extra).map(|idx| format!("fresh{idx}")));

        let unseen: Vec<&String> = vocabulary
            .iter()
            .filter(|word| progress.get(word.as_str()).map_or(true, |r| r.stage == 0))
            .collect();

        let queue = scheduler.select_queue(&progress, &vocabulary, today());
        let new_words: Vec<&str> = queue
            .items()
            .iter()
            .filter(|item| item.is_new)
            .map(|item| item.word.as_str())
            .collect();

        prop_assert_eq!(new_words.len(), quota.min(unseen.len()));
        for (picked, expected) in new_words.iter().zip(unseen.iter()) {
            prop_assert_eq!(*picked, expected.as_str());
        }
        prop_assert!(queue.items().iter().take(new_words.len()).all(|item| item.is_new));
    }
}
