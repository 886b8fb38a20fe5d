use crate::adapters::schema::{CREATE_NEWS_TABLE, INSERT_NEWS, SELECT_NEWS_BY_LINK, UPDATE_NEWS};
use crate::app::ingest::{merge_tags, IngestSummary, NewsStore};
use crate::domain::model::NewsDraft;
use crate::utils::error::{NewsError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Upserts articles into the SQLite file served by the database adapter.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NewsStore for SqliteStore {
    async fn save(&self, drafts: &[NewsDraft]) -> Result<IngestSummary> {
        if drafts.is_empty() {
            tracing::warn!("No news to save");
            return Ok(IngestSummary::default());
        }

        let path = self.path.clone();
        let drafts = drafts.to_vec();

        let summary = tokio::task::spawn_blocking(move || upsert_all(&path, &drafts))
            .await
            .map_err(|e| NewsError::engine(format!("database worker failed: {}", e)))??;

        tracing::info!(
            "Saved {} articles to {} ({} new, {} updated)",
            summary.total(),
            self.path.display(),
            summary.inserted,
            summary.updated
        );
        Ok(summary)
    }
}

fn upsert_all(path: &Path, drafts: &[NewsDraft]) -> Result<IngestSummary> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut conn = Connection::open(path)?;
    conn.execute(CREATE_NEWS_TABLE, [])?;

    let tx = conn.transaction()?;
    let mut summary = IngestSummary::default();

    for draft in drafts {
        let existing: Option<(i64, Option<String>)> = tx
            .query_row(SELECT_NEWS_BY_LINK, [&draft.link], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;

        match existing {
            Some((id, stored_tags)) => {
                let stored: Vec<String> = match stored_tags.as_deref() {
                    Some(raw) if !raw.trim().is_empty() => {
                        serde_json::from_str(raw).unwrap_or_else(|e| {
                            tracing::warn!("Discarding unreadable tags of news {}: {}", id, e);
                            Vec::new()
                        })
                    }
                    _ => Vec::new(),
                };
                let tags = serde_json::to_string(&merge_tags(&stored, &draft.tags))?;

                tx.execute(
                    UPDATE_NEWS,
                    params![
                        draft.title,
                        draft.source,
                        draft.published_at,
                        tags,
                        draft.image_url,
                        draft.content,
                        id
                    ],
                )?;
                summary.updated += 1;
            }
            None => {
                let tags = serde_json::to_string(&draft.tags)?;
                tx.execute(
                    INSERT_NEWS,
                    params![
                        draft.title,
                        draft.source,
                        draft.link,
                        draft.published_at,
                        tags,
                        draft.image_url,
                        draft.content
                    ],
                )?;
                summary.inserted += 1;
            }
        }
    }

    tx.commit()?;
    Ok(summary)
}
