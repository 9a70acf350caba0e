use super::{ProgressMap, ProgressRecord, ProgressStore, StoreResult};

/// Progress kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    records: ProgressMap,
    save_count: usize,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ProgressRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.word.clone(), record))
                .collect(),
            save_count: 0,
        }
    }

    /// Number of successful `save_all` calls, including those made through `upsert`/`remove`.
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    pub fn records(&self) -> &ProgressMap {
        &self.records
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> ProgressMap {
        self.records.clone()
    }

    fn save_all(&mut self, records: &ProgressMap) -> StoreResult<()> {
        self.records = records.clone();
        self.save_count += 1;
        Ok(())
    }

    fn get(&self, word: &str) -> Option<ProgressRecord> {
        self.records.get(word).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_upsert_counts_saves() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut store = MemoryProgressStore::new();
        store.upsert(ProgressRecord::new("ねこ", today)).unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.get("ねこ").map(|r| r.stage), Some(0));
    }

    #[test]
    fn test_remove_missing_word_does_not_save() {
        let mut store = MemoryProgressStore::new();
        assert!(store.remove("ねこ").unwrap().is_none());
        assert_eq!(store.save_count(), 0);
    }
}
