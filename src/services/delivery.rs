use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::db::models::format_date;
use crate::services::scheduler::QueueItem;

pub const DEFAULT_OUTBOX_DIR: &str = "outbox";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryProviderType {
    Outbox,
    Mock,
    None,
}

impl DeliveryProviderType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "outbox" | "file" => Some(Self::Outbox),
            "mock" => Some(Self::Mock),
            "none" | "disabled" => Some(Self::None),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Outbox => "outbox",
            Self::Mock => "mock",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub provider: DeliveryProviderType,
    pub outbox_dir: PathBuf,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            provider: DeliveryProviderType::Outbox,
            outbox_dir: PathBuf::from(DEFAULT_OUTBOX_DIR),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery not configured: {0}")]
    NotConfigured(&'static str),
    #[error("delivery io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("digest encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Presentation content for one queued word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedItem {
    pub word: String,
    pub stage: u32,
    pub is_new: bool,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryReceipt {
    pub rendered: Vec<RenderedItem>,
    /// Where the batch ended up, for channels that write somewhere.
    pub location: Option<PathBuf>,
}

/// Hands a whole study queue to the learner. Progress is only committed after `Ok`.
pub trait DeliveryChannel {
    fn deliver(
        &mut self,
        date: NaiveDate,
        items: &[QueueItem],
    ) -> Result<DeliveryReceipt, DeliveryError>;
}

pub fn render_item(item: &QueueItem) -> RenderedItem {
    let content = if item.is_new {
        format!("{} [new]", item.word)
    } else {
        format!("{} [review, stage {}]", item.word, item.stage)
    };
    RenderedItem {
        word: item.word.clone(),
        stage: item.stage,
        is_new: item.is_new,
        content,
    }
}

pub fn digest_subject(date: NaiveDate, items: &[QueueItem]) -> String {
    format!("{} review ({} words)", format_date(date), items.len())
}

#[derive(Serialize)]
struct OutboxDigest<'a> {
    date: String,
    subject: String,
    new_count: usize,
    review_count: usize,
    items: &'a [RenderedItem],
}

#[derive(Debug, Clone)]
pub struct DeliveryService {
    config: DeliveryConfig,
}

impl DeliveryService {
    pub fn from_config(config: DeliveryConfig) -> Self {
        Self { config }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.config.provider, DeliveryProviderType::None)
    }

    pub fn outbox_path(&self, date: NaiveDate) -> PathBuf {
        self.config
            .outbox_dir
            .join(format!("review-{}.json", format_date(date)))
    }

    fn write_outbox(
        &self,
        date: NaiveDate,
        items: &[QueueItem],
        rendered: &[RenderedItem],
    ) -> Result<PathBuf, DeliveryError> {
        let dir = &self.config.outbox_dir;
        fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;

        let new_count = items.iter().filter(|item| item.is_new).count();
        let digest = OutboxDigest {
            date: format_date(date),
            subject: digest_subject(date, items),
            new_count,
            review_count: items.len() - new_count,
            items: rendered,
        };
        let content = serde_json::to_string_pretty(&digest)?;

        let path = self.outbox_path(date);
        fs::write(&path, content).map_err(|source| io_error(&path, source))?;
        Ok(path)
    }
}

impl DeliveryChannel for DeliveryService {
    fn deliver(
        &mut self,
        date: NaiveDate,
        items: &[QueueItem],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let rendered: Vec<RenderedItem> = items.iter().map(render_item).collect();

        let location = match self.config.provider {
            DeliveryProviderType::Outbox => Some(self.write_outbox(date, items, &rendered)?),
            DeliveryProviderType::Mock => None,
            DeliveryProviderType::None => {
                return Err(DeliveryError::NotConfigured("DELIVERY_PROVIDER"))
            }
        };

        info!(
            provider = self.config.provider.as_str(),
            items = rendered.len(),
            "study queue delivered"
        );

        Ok(DeliveryReceipt { rendered, location })
    }
}

fn io_error(path: &Path, source: std::io::Error) -> DeliveryError {
    DeliveryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn items() -> Vec<QueueItem> {
        vec![
            QueueItem {
                word: "ねこ".into(),
                stage: 0,
                is_new: true,
            },
            QueueItem {
                word: "いぬ".into(),
                stage: 3,
                is_new: false,
            },
        ]
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(DeliveryProviderType::parse("Outbox"), Some(DeliveryProviderType::Outbox));
        assert_eq!(DeliveryProviderType::parse(" mock "), Some(DeliveryProviderType::Mock));
        assert_eq!(DeliveryProviderType::parse("none"), Some(DeliveryProviderType::None));
        assert_eq!(DeliveryProviderType::parse("smtp"), None);
    }

    #[test]
    fn test_render_marks_new_and_review() {
        let rendered: Vec<String> = items().iter().map(|i| render_item(i).content).collect();
        assert_eq!(rendered, vec!["ねこ [new]", "いぬ [review, stage 3]"]);
    }

    #[test]
    fn test_outbox_writes_digest() {
        let dir = TempDir::new().unwrap();
        let mut service = DeliveryService::from_config(DeliveryConfig {
            provider: DeliveryProviderType::Outbox,
            outbox_dir: dir.path().join("outbox"),
        });

        let receipt = service.deliver(day(), &items()).unwrap();
        let path = receipt.location.unwrap();
        assert_eq!(path, dir.path().join("outbox/review-2024-01-01.json"));

        let digest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(digest["subject"], "2024-01-01 review (2 words)");
        assert_eq!(digest["new_count"], 1);
        assert_eq!(digest["review_count"], 1);
        assert_eq!(digest["items"][0]["word"], "ねこ");
    }

    #[test]
    fn test_mock_accepts_without_writing() {
        let mut service = DeliveryService::from_config(DeliveryConfig {
            provider: DeliveryProviderType::Mock,
            outbox_dir: PathBuf::from("/nonexistent/outbox"),
        });
        let receipt = service.deliver(day(), &items()).unwrap();
        assert_eq!(receipt.rendered.len(), 2);
        assert!(receipt.location.is_none());
    }

    #[test]
    fn test_none_provider_fails() {
        let mut service = DeliveryService::from_config(DeliveryConfig {
            provider: DeliveryProviderType::None,
            outbox_dir: PathBuf::from(DEFAULT_OUTBOX_DIR),
        });
        assert!(!service.is_available());
        let err = service.deliver(day(), &items()).unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured(_)));
    }
}
