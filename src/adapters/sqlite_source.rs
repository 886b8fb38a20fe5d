use crate::adapters::absorb;
use crate::adapters::schema::{SELECT_ALL_NEWS, SELECT_NEWS_BY_ID};
use crate::domain::model::{is_well_formed, retain_well_formed, NewsDraft, NewsRecord};
use crate::domain::ports::NewsSource;
use crate::utils::error::{NewsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use rusqlite::{Connection, OpenFlags, Row};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use url::Url;

pub const DEFAULT_INSERT_LATENCY: Duration = Duration::from_millis(300);

/// Where the SQLite database file is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    Remote(Url),
    Local(PathBuf),
}

impl DbLocation {
    /// Absolute http(s) URLs are fetched as-is. Anything else is joined onto
    /// `base_url` when one is configured, or read from disk otherwise.
    pub fn resolve(db_path: &str, base_url: Option<&str>) -> Result<Self> {
        if let Ok(url) = Url::parse(db_path) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(DbLocation::Remote(url));
            }
        }

        match base_url {
            Some(base) => {
                let base = Url::parse(base).map_err(|e| NewsError::InvalidConfigValueError {
                    field: "base_url".to_string(),
                    value: base.to_string(),
                    reason: format!("Invalid URL format: {}", e),
                })?;
                let url = base
                    .join(db_path)
                    .map_err(|e| NewsError::InvalidConfigValueError {
                        field: "db_path".to_string(),
                        value: db_path.to_string(),
                        reason: format!("cannot be joined onto {}: {}", base, e),
                    })?;
                Ok(DbLocation::Remote(url))
            }
            None => Ok(DbLocation::Local(PathBuf::from(db_path))),
        }
    }
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbLocation::Remote(url) => write!(f, "{}", url),
            DbLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Serves news from a SQLite database file fetched wholesale on every call.
///
/// Each operation downloads the file, copies it into a scratch file, opens a
/// read-only connection, runs a single query and closes everything again.
/// No connection outlives the call that opened it.
#[derive(Debug, Clone)]
pub struct SqliteNewsSource {
    location: DbLocation,
    client: Client,
    scratch_dir: Option<PathBuf>,
    insert_latency: Duration,
    timeout: Option<Duration>,
}

impl SqliteNewsSource {
    pub fn new(location: DbLocation) -> Self {
        Self {
            location,
            client: Client::new(),
            scratch_dir: None,
            insert_latency: DEFAULT_INSERT_LATENCY,
            timeout: None,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Directory for the per-call copy of the database. Defaults to the
    /// system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn with_insert_latency(mut self, latency: Duration) -> Self {
        self.insert_latency = latency;
        self
    }

    /// Upper bound for the file download. Without one a stalled server
    /// stalls the call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// Accepts a new article for the `news` table.
    ///
    /// The fetched database is a read-only snapshot, so nothing is written:
    /// the call simulates the round trip and reports success. Durable writes
    /// go through the ingestion tool instead.
    pub async fn insert(&self, draft: &NewsDraft) -> Result<bool> {
        tracing::info!(
            "Inserting news into SQLite snapshot (not persisted): {}",
            draft.title
        );

        if !self.insert_latency.is_zero() {
            tokio::time::sleep(self.insert_latency).await;
        }

        Ok(true)
    }

    async fn fetch_database(&self) -> Result<Vec<u8>> {
        match &self.location {
            DbLocation::Remote(url) => {
                tracing::debug!("Fetching database file from: {}", url);
                let mut request = self.client.get(url.clone());
                if let Some(timeout) = self.timeout {
                    request = request.timeout(timeout);
                }

                let response = request.send().await?;
                tracing::debug!("Database response status: {}", response.status());

                if !response.status().is_success() {
                    return Err(NewsError::StatusError {
                        status: response.status().as_u16(),
                        url: url.to_string(),
                    });
                }

                Ok(response.bytes().await?.to_vec())
            }
            DbLocation::Local(path) => {
                tracing::debug!("Reading database file from: {}", path.display());
                Ok(tokio::fs::read(path).await?)
            }
        }
    }

    /// Fetches the file and runs `query` against a fresh read-only handle on
    /// the blocking pool.
    async fn with_database<T, F>(&self, query: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let bytes = self.fetch_database().await?;
        let scratch_dir = self.scratch_dir.clone();

        tokio::task::spawn_blocking(move || {
            let scratch = materialize(&bytes, scratch_dir.as_deref())?;
            let conn = Connection::open_with_flags(
                scratch.path(),
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;

            let result = query(&conn);

            if let Err((_, e)) = conn.close() {
                tracing::warn!("Failed to close SQLite handle cleanly: {}", e);
            }
            result
        })
        .await
        .map_err(|e| NewsError::engine(format!("database worker failed: {}", e)))?
    }

    async fn try_load_all(&self) -> Result<Vec<NewsRecord>> {
        let records = self
            .with_database(|conn| {
                let mut stmt = conn.prepare(SELECT_ALL_NEWS)?;
                let mut rows = stmt.query([])?;
                let mut records = Vec::new();
                while let Some(row) = rows.next()? {
                    records.push(decode_row(row)?);
                }
                Ok(records)
            })
            .await?;

        let records = retain_well_formed(records, self.name());
        tracing::info!("Loaded {} records from SQLite", records.len());
        Ok(records)
    }

    async fn try_get_by_id(&self, id: i64) -> Result<Option<NewsRecord>> {
        tracing::debug!("Looking up news id {} in SQLite", id);
        let record = self
            .with_database(move |conn| {
                let mut stmt = conn.prepare(SELECT_NEWS_BY_ID)?;
                let mut rows = stmt.query([id])?;
                let record = match rows.next()? {
                    Some(row) => Some(decode_row(row)?),
                    None => None,
                };
                Ok(record)
            })
            .await?;

        Ok(record.filter(|record| is_well_formed(record, self.name())))
    }
}

#[async_trait]
impl NewsSource for SqliteNewsSource {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn load_all(&self) -> Result<Vec<NewsRecord>> {
        absorb(self.name(), "load_all", self.try_load_all().await)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<NewsRecord>> {
        absorb(self.name(), "get_by_id", self.try_get_by_id(id).await)
    }
}

fn materialize(bytes: &[u8], scratch_dir: Option<&Path>) -> Result<NamedTempFile> {
    let file = match scratch_dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    };
    let mut file =
        file.map_err(|e| NewsError::engine(format!("cannot create scratch file: {}", e)))?;

    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| NewsError::engine(format!("cannot write scratch file: {}", e)))?;

    Ok(file)
}

/// Text column that may be NULL or missing from the table entirely.
fn optional_text(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<String>> {
    match row.get::<_, Option<String>>(column) {
        Ok(value) => Ok(value),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn decode_row(row: &Row<'_>) -> Result<NewsRecord> {
    let tags = match optional_text(row, "tags")? {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str::<Option<Vec<String>>>(&raw)?.unwrap_or_default()
        }
        _ => Vec::new(),
    };

    Ok(NewsRecord {
        id: row.get("id")?,
        title: optional_text(row, "title")?.unwrap_or_default(),
        source: optional_text(row, "source")?.unwrap_or_default(),
        link: optional_text(row, "link")?.unwrap_or_default(),
        published_at: optional_text(row, "publishedAt")?.unwrap_or_default(),
        tags,
        image_url: optional_text(row, "imageUrl")?.unwrap_or_default(),
        content: Some(optional_text(row, "content")?.unwrap_or_default()),
    })
}
