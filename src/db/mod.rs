//! Persistence for review progress and the vocabulary list.
//!
//! The [`ProgressStore`] is the single source of truth for stage and date state. It is read
//! once at the start of a review pass and written at most once at the end.

pub mod json_store;
pub mod memory;
pub mod models;
pub mod vocabulary;

use std::path::PathBuf;

use thiserror::Error;

pub use json_store::JsonProgressStore;
pub use memory::MemoryProgressStore;
pub use models::{ProgressMap, ProgressRecord};
pub use vocabulary::{StaticVocabulary, TextFileVocabulary, VocabularySource};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait ProgressStore {
    /// Returns every record. Never fails: a missing or unreadable backing resource yields an
    /// empty map so that a fresh install always works.
    fn load(&self) -> ProgressMap;

    /// Persists the whole map. Either every record is written or none is.
    fn save_all(&mut self, records: &ProgressMap) -> StoreResult<()>;

    fn get(&self, word: &str) -> Option<ProgressRecord> {
        self.load().remove(word)
    }

    fn upsert(&mut self, record: ProgressRecord) -> StoreResult<()> {
        let mut records = self.load();
        records.insert(record.word.clone(), record);
        self.save_all(&records)
    }

    /// Administrative removal; returns the removed record if there was one.
    fn remove(&mut self, word: &str) -> StoreResult<Option<ProgressRecord>> {
        let mut records = self.load();
        let removed = records.remove(word);
        if removed.is_some() {
            self.save_all(&records)?;
        }
        Ok(removed)
    }
}
