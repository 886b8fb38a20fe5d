#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::DbLocation;
use crate::domain::model::DataSource;
use crate::utils::error::{NewsError, Result};
use crate::utils::validation::{validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "./data/news.db";
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Settings for the news service, resolved once before construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsConfig {
    pub data_source: DataSource,
    pub db_path: String,
    pub base_url: Option<String>,
    pub dataset_path: Option<PathBuf>,
    pub environment: String,
    pub json_latency_ms: u64,
    pub insert_latency_ms: u64,
    pub scratch_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            data_source: DataSource::Json,
            db_path: DEFAULT_DB_PATH.to_string(),
            base_url: None,
            dataset_path: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            json_latency_ms: 500,
            insert_latency_ms: 300,
            scratch_dir: None,
            request_timeout_secs: None,
        }
    }
}

impl NewsConfig {
    /// Defaults overridden by `NEWS_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(value) = env::var("NEWS_DATA_SOURCE") {
            self.data_source = DataSource::from_config_value(&value);
        }
        if let Ok(value) = env::var("NEWS_DB_PATH") {
            self.db_path = value;
        }
        if let Ok(value) = env::var("NEWS_BASE_URL") {
            self.base_url = Some(value);
        }
        if let Ok(value) = env::var("NEWS_DATASET_PATH") {
            self.dataset_path = Some(PathBuf::from(value));
        }
        if let Ok(value) = env::var("NEWS_ENV") {
            self.environment = value;
        }
    }
}

impl Validate for NewsConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            validate_url("base_url", base_url)?;
        }

        check_location("db_path", &self.db_path)?;
        DbLocation::resolve(&self.db_path, self.base_url.as_deref())?;

        if let Some(path) = &self.dataset_path {
            check_location("dataset_path", &path.to_string_lossy())?;
        }

        Ok(())
    }
}

fn check_location(field: &str, value: &str) -> Result<()> {
    let reason = if value.trim().is_empty() {
        "cannot be empty"
    } else if value.contains('\0') {
        "contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(NewsError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    })
}
