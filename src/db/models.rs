use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// All progress records keyed by word.
pub type ProgressMap = BTreeMap<String, ProgressRecord>;

/// Review progress for one word.
///
/// `stage == 0` means the word has never been presented. Dates are calendar days in the
/// learner's local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressRecord {
    pub word: String,
    pub stage: u32,
    pub first_seen: Option<NaiveDate>,
    pub last_review: Option<NaiveDate>,
    pub next_review: Option<NaiveDate>,
}

impl ProgressRecord {
    pub fn new(word: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            word: word.into(),
            stage: 0,
            first_seen: Some(today),
            last_review: None,
            next_review: Some(today),
        }
    }

    pub fn is_presented(&self) -> bool {
        self.stage >= 1
    }

    /// A presented record without a next review date is treated as overdue.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review.map_or(true, |date| date <= today)
    }
}

/// On-disk shape of a record. Every field is optional so that older files (with `count`
/// instead of `stage`, or empty date strings) still load.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    #[serde(default)]
    stage: Option<i64>,
    #[serde(default, skip_serializing)]
    count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_seen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_review: Option<String>,
}

impl StoredRecord {
    pub(crate) fn into_record(self, word: String) -> ProgressRecord {
        let stage = self
            .stage
            .or(self.count)
            .map(|value| u32::try_from(value.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0);

        ProgressRecord {
            word,
            stage,
            first_seen: parse_date(self.first_seen.as_deref()),
            last_review: parse_date(self.last_review.as_deref()),
            next_review: parse_date(self.next_review.as_deref()),
        }
    }
}

impl From<&ProgressRecord> for StoredRecord {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            stage: Some(i64::from(record.stage)),
            count: None,
            first_seen: record.first_seen.map(format_date),
            last_review: record.last_review.map(format_date),
            next_review: record.next_review.map(format_date),
        }
    }
}

pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| NaiveDate::parse_from_str(value, DATE_FORMAT).ok())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
