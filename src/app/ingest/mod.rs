//! Offline dataset building: pull articles from a news API and upsert them
//! into the JSON document or SQLite file the read path serves.

pub mod bing;
pub mod brave;
pub mod json_store;
pub mod newsapi;
pub mod provider;
pub mod sqlite_store;

pub use bing::BingProvider;
pub use brave::BraveProvider;
pub use json_store::JsonStore;
pub use newsapi::NewsApiProvider;
pub use provider::{ApiProvider, ConfiguredProvider, SearchProvider};
pub use sqlite_store::SqliteStore;

use crate::domain::model::NewsDraft;
use crate::utils::error::{NewsError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Json,
    Sqlite,
}

impl FromStr for StorageType {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageType::Json),
            "sqlite" => Ok(StorageType::Sqlite),
            other => Err(NewsError::InvalidConfigValueError {
                field: "ingest.storage_type".to_string(),
                value: other.to_string(),
                reason: "expected 'json' or 'sqlite'".to_string(),
            }),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::Json => f.write_str("json"),
            StorageType::Sqlite => f.write_str("sqlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub keywords: Vec<String>,
    pub storage_type: StorageType,
    pub max_results: usize,
    pub api_provider: ApiProvider,
    pub api_key: Option<String>,
    /// Overrides the provider's default endpoint.
    pub endpoint: Option<String>,
    pub json_path: PathBuf,
    pub db_path: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            keywords: Self::parse_keywords("AI,machine learning,deep learning"),
            storage_type: StorageType::Json,
            max_results: 20,
            api_provider: ApiProvider::default(),
            api_key: None,
            endpoint: None,
            json_path: PathBuf::from("./data/news.json"),
            db_path: PathBuf::from("./data/news.db"),
        }
    }
}

impl IngestConfig {
    /// Comma separated list; blanks are dropped.
    pub fn parse_keywords(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|kw| !kw.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.api_provider.default_endpoint())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub updated: usize,
}

impl IngestSummary {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Destination for fetched articles. Records are matched on `link`.
pub trait NewsStore: Send + Sync {
    fn save(
        &self,
        drafts: &[NewsDraft],
    ) -> impl std::future::Future<Output = Result<IngestSummary>> + Send;
}

/// Appends `incoming` tags not already present, keeping the existing order.
pub fn merge_tags(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut merged = existing.to_vec();
    for tag in incoming {
        if !merged.contains(tag) {
            merged.push(tag.clone());
        }
    }
    merged
}

fn is_valid_draft(draft: &NewsDraft) -> bool {
    match draft.validate() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Skipping draft '{}': {}", draft.title, e);
            false
        }
    }
}

/// Reads a JSON array of drafts, dropping entries that fail validation.
pub async fn load_drafts(path: &Path) -> Result<Vec<NewsDraft>> {
    let text = tokio::fs::read_to_string(path).await?;
    let drafts: Vec<NewsDraft> = serde_json::from_str(&text)?;

    Ok(drafts.into_iter().filter(is_valid_draft).collect())
}

/// Fetches every keyword from the provider and hands the combined result to
/// the store in one batch.
pub struct Ingestor<P: SearchProvider, S: NewsStore> {
    provider: P,
    store: S,
    pause: Duration,
}

impl<P: SearchProvider, S: NewsStore> Ingestor<P, S> {
    pub fn new(provider: P, store: S) -> Self {
        Self {
            provider,
            store,
            pause: Duration::from_secs(1),
        }
    }

    /// Delay between keyword queries, to stay under the provider's rate limit.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub async fn run(&self, keywords: &[String]) -> Result<IngestSummary> {
        if keywords.is_empty() {
            return Err(NewsError::config("no keywords configured for ingestion"));
        }
        tracing::info!(
            "Fetching news from {} for keywords: {}",
            self.provider.name(),
            keywords.join(", ")
        );

        let mut drafts = Vec::new();
        for (i, keyword) in keywords.iter().enumerate() {
            match self.provider.search(keyword).await {
                Ok(found) => {
                    tracing::info!("Found {} articles for '{}'", found.len(), keyword);
                    drafts.extend(found.into_iter().filter(is_valid_draft));
                }
                Err(e) => tracing::error!("❌ Search for '{}' failed: {}", keyword, e),
            }

            if i + 1 < keywords.len() && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        if drafts.is_empty() {
            tracing::warn!("No articles found, nothing to save");
            return Ok(IngestSummary::default());
        }

        self.store.save(&drafts).await
    }
}
