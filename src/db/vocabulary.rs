use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("vocabulary io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered, duplicate-free list of known words.
pub trait VocabularySource {
    fn list(&self) -> Result<Vec<String>, VocabularyError>;
}

/// Outcome of rewriting a vocabulary file without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub original: usize,
    pub unique: usize,
    pub duplicates: Vec<String>,
}

/// Trims entries, drops blanks and keeps the first occurrence of each word.
/// Returns the unique words and the discarded repeats, both in input order.
pub fn dedup_words<I, S>(words: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    let mut duplicates = Vec::new();

    for word in words {
        let word = word.as_ref().trim();
        if word.is_empty() {
            continue;
        }
        if seen.insert(word.to_string()) {
            unique.push(word.to_string());
        } else {
            duplicates.push(word.to_string());
        }
    }

    (unique, duplicates)
}

#[derive(Debug, Clone, Default)]
pub struct StaticVocabulary {
    words: Vec<String>,
}

impl StaticVocabulary {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (words, _) = dedup_words(words);
        Self { words }
    }
}

impl VocabularySource for StaticVocabulary {
    fn list(&self) -> Result<Vec<String>, VocabularyError> {
        Ok(self.words.clone())
    }
}

/// One word per line, UTF-8.
#[derive(Debug, Clone)]
pub struct TextFileVocabulary {
    path: PathBuf,
}

impl TextFileVocabulary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> VocabularyError {
        VocabularyError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_raw(&self) -> Result<Option<String>, VocabularyError> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|source| self.io_error(source))
    }

    /// Rewrites the file so every word appears once, first occurrence first.
    pub fn dedup_file(&self) -> Result<DedupReport, VocabularyError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let original = raw.lines().filter(|line| !line.trim().is_empty()).count();
        let (unique, duplicates) = dedup_words(raw.lines());

        let mut content = unique.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&self.path, content).map_err(|source| self.io_error(source))?;

        info!(
            path = %self.path.display(),
            original,
            unique = unique.len(),
            removed = duplicates.len(),
            "vocabulary deduplicated"
        );

        Ok(DedupReport {
            original,
            unique: unique.len(),
            duplicates,
        })
    }

    /// Appends `word` unless it is blank or already listed. Returns whether it was added.
    pub fn add_word(&self, word: &str) -> Result<bool, VocabularyError> {
        let word = word.trim();
        if word.is_empty() {
            return Ok(false);
        }

        let raw = self.read_raw()?.unwrap_or_default();
        if raw.lines().any(|line| line.trim() == word) {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        let separator = if raw.is_empty() || raw.ends_with('\n') { "" } else { "\n" };
        writeln!(file, "{separator}{word}").map_err(|source| self.io_error(source))?;

        Ok(true)
    }
}

impl VocabularySource for TextFileVocabulary {
    fn list(&self) -> Result<Vec<String>, VocabularyError> {
        let Some(raw) = self.read_raw()? else {
            warn!(path = %self.path.display(), "vocabulary file not found, no new words available");
            return Ok(Vec::new());
        };

        let (unique, duplicates) = dedup_words(raw.lines());
        if !duplicates.is_empty() {
            warn!(
                path = %self.path.display(),
                count = duplicates.len(),
                "vocabulary has duplicate entries, later copies ignored"
            );
        }
        Ok(unique)
    }
}
