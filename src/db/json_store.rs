use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::models::{ProgressMap, StoredRecord};
use super::{ProgressStore, StoreError, StoreResult};

const TMP_SUFFIX: &str = "tmp";
const BACKUP_SUFFIX: &str = "bak";

/// Progress kept as one pretty-printed JSON object: `{ "<word>": { "stage": .., ... } }`.
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist.
    fn read_records(&self) -> StoreResult<Option<ProgressMap>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Some(ProgressMap::new()));
        }

        let stored: BTreeMap<String, StoredRecord> = serde_json::from_str(&content)?;
        let records = stored
            .into_iter()
            .map(|(word, record)| {
                let record = record.into_record(word.clone());
                (word, record)
            })
            .collect();
        Ok(Some(records))
    }

    /// Copies an unreadable store aside before it gets replaced by the next save.
    fn preserve_unreadable(&self) {
        let backup = sibling_path(&self.path, BACKUP_SUFFIX);
        match fs::copy(&self.path, &backup) {
            Ok(_) => warn!(backup = %backup.display(), "unreadable progress store copied aside"),
            Err(err) => warn!(error = %err, "failed to copy unreadable progress store"),
        }
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self) -> ProgressMap {
        match self.read_records() {
            Ok(Some(records)) => {
                debug!(path = %self.path.display(), count = records.len(), "progress loaded");
                records
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "progress store not found, starting empty");
                ProgressMap::new()
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "progress store unreadable, starting empty"
                );
                if self.path.is_file() {
                    self.preserve_unreadable();
                }
                ProgressMap::new()
            }
        }
    }

    fn save_all(&mut self, records: &ProgressMap) -> StoreResult<()> {
        let stored: BTreeMap<&str, StoredRecord> = records
            .iter()
            .map(|(word, record)| (word.as_str(), StoredRecord::from(record)))
            .collect();
        let content = serde_json::to_string_pretty(&stored)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Write beside the target and rename over it so readers never see a partial file.
        let tmp = sibling_path(&self.path, TMP_SUFFIX);
        fs::write(&tmp, content).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        debug!(path = %self.path.display(), count = records.len(), "progress saved");
        Ok(())
    }
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "progress.json".into());
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
