#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;

use danci_review::db::{ProgressMap, ProgressRecord, ProgressStore, StoreError, StoreResult};
use danci_review::services::delivery::{
    render_item, DeliveryChannel, DeliveryError, DeliveryReceipt,
};
use danci_review::services::scheduler::QueueItem;

pub fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn record(word: &str, stage: u32, next_review: &str) -> ProgressRecord {
    ProgressRecord {
        word: word.to_string(),
        stage,
        first_seen: Some(day("2023-12-01")),
        last_review: Some(day("2023-12-20")),
        next_review: Some(day(next_review)),
    }
}

/// Accepts every batch and remembers what it was given.
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    pub batches: Vec<(NaiveDate, Vec<QueueItem>)>,
}

impl DeliveryChannel for RecordingDelivery {
    fn deliver(
        &mut self,
        date: NaiveDate,
        items: &[QueueItem],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        self.batches.push((date, items.to_vec()));
        Ok(DeliveryReceipt {
            rendered: items.iter().map(render_item).collect(),
            location: None,
        })
    }
}

/// Rejects every batch.
#[derive(Debug, Default)]
pub struct FailingDelivery {
    pub attempts: usize,
}

impl DeliveryChannel for FailingDelivery {
    fn deliver(
        &mut self,
        _date: NaiveDate,
        _items: &[QueueItem],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        self.attempts += 1;
        Err(DeliveryError::Rejected("mailbox full".to_string()))
    }
}

/// Serves fixed records and fails on every write.
#[derive(Debug, Default)]
pub struct FailingStore {
    pub records: ProgressMap,
}

impl ProgressStore for FailingStore {
    fn load(&self) -> ProgressMap {
        self.records.clone()
    }

    fn save_all(&mut self, _records: &ProgressMap) -> StoreResult<()> {
        Err(StoreError::Io {
            path: PathBuf::from("/read-only/progress.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}
