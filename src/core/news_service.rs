use crate::adapters::{Dataset, DbLocation, JsonNewsSource, SqliteNewsSource};
use crate::config::NewsConfig;
use crate::domain::model::{DataSource, NewsDraft, NewsRecord};
use crate::domain::ports::NewsSource;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Snapshot of the service configuration, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub data_source: DataSource,
    pub db_path: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
}

/// Single entry point for reading news.
///
/// Holds both adapters and dispatches to the one named by the current
/// [`DataSource`]. Read operations never fail: every error ends up as an
/// empty list, `None` or `false`.
pub struct NewsService {
    data_source: DataSource,
    db_path: String,
    environment: String,
    json: JsonNewsSource,
    sqlite: SqliteNewsSource,
}

impl NewsService {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let dataset = match &config.dataset_path {
            Some(path) => Dataset::File(path.clone()),
            None => Dataset::Bundled,
        };
        let json = JsonNewsSource::new(dataset)
            .with_latency(Duration::from_millis(config.json_latency_ms));

        let location = DbLocation::resolve(&config.db_path, config.base_url.as_deref())?;
        let mut sqlite = SqliteNewsSource::new(location)
            .with_insert_latency(Duration::from_millis(config.insert_latency_ms));
        if let Some(dir) = &config.scratch_dir {
            sqlite = sqlite.with_scratch_dir(dir.clone());
        }
        if let Some(secs) = config.request_timeout_secs {
            sqlite = sqlite.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self::with_sources(
            config.data_source,
            config.db_path.clone(),
            config.environment.clone(),
            json,
            sqlite,
        ))
    }

    /// Builds a service around adapters the caller has already set up.
    pub fn with_sources(
        data_source: DataSource,
        db_path: impl Into<String>,
        environment: impl Into<String>,
        json: JsonNewsSource,
        sqlite: SqliteNewsSource,
    ) -> Self {
        let service = Self {
            data_source,
            db_path: db_path.into(),
            environment: environment.into(),
            json,
            sqlite,
        };

        tracing::info!(
            "News service initialised - data source: {}, db path: {}",
            service.data_source,
            service.db_path
        );
        service
    }

    pub fn data_source(&self) -> DataSource {
        self.data_source
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    fn active(&self) -> &dyn NewsSource {
        match self.data_source {
            DataSource::Json => &self.json,
            DataSource::Sqlite => &self.sqlite,
        }
    }

    /// Loads every record from the active source.
    ///
    /// If the active source errors and is not the packaged dataset, the
    /// packaged dataset is tried once before giving up with an empty list.
    pub async fn load_news(&self) -> Vec<NewsRecord> {
        tracing::info!("Loading news from {}...", self.data_source);

        let err = match self.active().load_all().await {
            Ok(records) => return records,
            Err(e) => e,
        };
        tracing::error!("❌ Failed to load news from {}: {}", self.data_source, err);

        if self.data_source != DataSource::Json {
            tracing::info!("Falling back to the json data source...");
            match self.json.load_all().await {
                Ok(records) => return records,
                Err(e) => tracing::error!("❌ JSON fallback failed as well: {}", e),
            }
        }

        Vec::new()
    }

    pub async fn get_news_by_id(&self, id: i64) -> Option<NewsRecord> {
        match self.active().get_by_id(id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("❌ Failed to get news {} from {}: {}", id, self.data_source, e);
                None
            }
        }
    }

    pub async fn get_news_by_tag(&self, tag: &str) -> Vec<NewsRecord> {
        match self.active().get_by_tag(tag).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    "❌ Failed to filter news by tag '{}' from {}: {}",
                    tag,
                    self.data_source,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Only the SQLite source accepts new records; with any other source
    /// this returns `false` without touching the network.
    pub async fn add_news(&self, draft: &NewsDraft) -> bool {
        match self.data_source {
            DataSource::Sqlite => match self.sqlite.insert(draft).await {
                Ok(inserted) => inserted,
                Err(e) => {
                    tracing::error!("❌ Failed to add news: {}", e);
                    false
                }
            },
            DataSource::Json => {
                tracing::warn!("Adding news is only supported by the sqlite data source");
                false
            }
        }
    }

    pub fn switch_data_source(&mut self, data_source: DataSource) {
        tracing::info!(
            "Switching data source from {} to {}",
            self.data_source,
            data_source
        );
        self.data_source = data_source;
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            data_source: self.data_source,
            db_path: self.db_path.clone(),
            environment: self.environment.clone(),
            timestamp: Utc::now(),
        }
    }
}
