use std::path::PathBuf;

use thiserror::Error;

use crate::logging::{self, LogConfig, DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL};
use crate::services::delivery::{DeliveryConfig, DeliveryProviderType, DEFAULT_OUTBOX_DIR};
use crate::services::scheduler::{SchedulerConfig, DEFAULT_DAILY_NEW_QUOTA, DEFAULT_MAX_STAGES};

const DEFAULT_VOCAB_FILE: &str = "vocab.txt";
const DEFAULT_PROGRESS_FILE: &str = "progress.json";

const QUOTA_KEYS: &[&str] = &["DAILY_NEW_WORDS", "NEW_WORDS_PER_DAY", "DAILY_REVIEW_COUNT"];
const MAX_STAGES_KEYS: &[&str] = &["MAX_STAGES", "MAX_REVIEWS"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub vocab_file: PathBuf,
    pub progress_file: PathBuf,
    pub delivery: DeliveryConfig,
    pub seed: Option<u64>,
    pub logging: LogConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first_of = |keys: &[&'static str]| {
            keys.iter()
                .find_map(|key| get(*key).map(|value| (*key, value)))
        };

        let daily_new_quota = match first_of(QUOTA_KEYS) {
            Some((key, raw)) => validate_quota(key, parse_int(key, &raw)?)?,
            None => DEFAULT_DAILY_NEW_QUOTA,
        };
        let max_stages = match first_of(MAX_STAGES_KEYS) {
            Some((key, raw)) => validate_max_stages(key, parse_int(key, &raw)?)?,
            None => DEFAULT_MAX_STAGES,
        };

        let provider = match get("DELIVERY_PROVIDER") {
            Some(raw) => DeliveryProviderType::parse(&raw).ok_or(ConfigError::Invalid {
                key: "DELIVERY_PROVIDER",
                value: raw,
                reason: "expected outbox, mock or none",
            })?,
            None => DeliveryProviderType::Outbox,
        };

        let seed = match get("SRS_SEED") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "SRS_SEED",
                value: raw,
                reason: "expected an unsigned integer",
            })?),
            None => None,
        };

        Ok(Self {
            scheduler: SchedulerConfig {
                daily_new_quota,
                max_stages,
            },
            vocab_file: get("VOCAB_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_VOCAB_FILE)),
            progress_file: get("PROGRESS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRESS_FILE)),
            delivery: DeliveryConfig {
                provider,
                outbox_dir: get("OUTBOX_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTBOX_DIR)),
            },
            seed,
            logging: LogConfig {
                level: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
                file_logs: get("ENABLE_FILE_LOGS").is_some_and(|raw| logging::parse_flag(&raw)),
                dir: get("LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            },
        })
    }

    /// Applies command-line overrides, validated like their environment counterparts.
    pub fn with_overrides(
        mut self,
        daily_new_quota: Option<i64>,
        max_stages: Option<i64>,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if let Some(quota) = daily_new_quota {
            self.scheduler.daily_new_quota = validate_quota("--new-words", quota)?;
        }
        if let Some(stages) = max_stages {
            self.scheduler.max_stages = validate_max_stages("--max-stages", stages)?;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        Ok(self)
    }
}

fn parse_int(key: &'static str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim().parse::<i64>().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: "expected an integer",
    })
}

pub fn validate_quota(key: &'static str, value: i64) -> Result<usize, ConfigError> {
    if value < 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "daily new-word quota cannot be negative",
        });
    }
    usize::try_from(value).map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: "daily new-word quota is too large",
    })
}

pub fn validate_max_stages(key: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 1 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "stage cap must be at least 1",
        });
    }
    u32::try_from(value).map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: "stage cap is too large",
    })
}
