//! One scheduling pass for a given day.
//!
//! load progress -> select queue -> compute transitions -> deliver -> save.
//! Transitions are computed in memory before delivery so that a batch which cannot be
//! scheduled is never sent. Nothing is written unless delivery succeeded, so a failed pass
//! can simply be re-run.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::db::vocabulary::VocabularyError;
use crate::db::{ProgressRecord, ProgressStore, StoreError, VocabularySource};
use crate::services::delivery::{DeliveryChannel, DeliveryError, DeliveryReceipt};
use crate::services::interval::IntervalModel;
use crate::services::scheduler::{ScheduleError, Scheduler, StudyQueue};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("vocabulary unavailable: {0}")]
    Vocabulary(#[from] VocabularyError),
    #[error("nothing delivered: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("delivery failed, progress left unchanged: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("failed to save progress after delivery: {0}")]
    StoreWrite(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub queue: StudyQueue,
    pub updated: Vec<ProgressRecord>,
    pub receipt: DeliveryReceipt,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Nothing new and nothing due; the store was not touched.
    NothingDue,
    Completed(RunSummary),
}

pub struct ReviewSession<S, V, D> {
    store: S,
    vocabulary: V,
    delivery: D,
    scheduler: Scheduler,
    intervals: IntervalModel,
}

impl<S, V, D> ReviewSession<S, V, D>
where
    S: ProgressStore,
    V: VocabularySource,
    D: DeliveryChannel,
{
    pub fn new(
        store: S,
        vocabulary: V,
        delivery: D,
        scheduler: Scheduler,
        intervals: IntervalModel,
    ) -> Self {
        Self {
            store,
            vocabulary,
            delivery,
            scheduler,
            intervals,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    /// Computes what `run` would present, without delivering or writing anything.
    pub fn preview(&self, today: NaiveDate) -> Result<StudyQueue, RunError> {
        let progress = self.store.load();
        let vocabulary = self.vocabulary.list()?;
        Ok(self.scheduler.select_queue(&progress, &vocabulary, today))
    }

    pub fn run(&mut self, today: NaiveDate) -> Result<RunOutcome, RunError> {
        let mut progress = self.store.load();
        let vocabulary = self.vocabulary.list()?;

        let queue = self.scheduler.select_queue(&progress, &vocabulary, today);
        if queue.is_empty() {
            info!(%today, "nothing to study today");
            return Ok(RunOutcome::NothingDue);
        }

        info!(
            %today,
            total = queue.len(),
            new_words = queue.new_count(),
            reviews = queue.review_count(),
            "study queue ready"
        );

        let updated = self.scheduler.commit_transitions(
            &mut progress,
            &queue.words(),
            today,
            &mut self.intervals,
        )?;

        let receipt = match self.delivery.deliver(today, queue.items()) {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(error = %err, "delivery failed, progress not committed");
                return Err(RunError::Delivery(err));
            }
        };

        if let Err(err) = self.store.save_all(&progress) {
            error!(error = %err, words = updated.len(), "progress save failed after delivery");
            return Err(RunError::StoreWrite(err));
        }

        info!(words = updated.len(), "progress committed");

        Ok(RunOutcome::Completed(RunSummary {
            date: today,
            queue,
            updated,
            receipt,
        }))
    }
}
