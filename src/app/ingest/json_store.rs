use crate::app::ingest::{merge_tags, IngestSummary, NewsStore};
use crate::domain::model::{NewsDraft, NewsRecord};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;

/// Upserts articles into the JSON document served by the static adapter.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_existing(&self) -> Result<Vec<NewsRecord>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl NewsStore for JsonStore {
    async fn save(&self, drafts: &[NewsDraft]) -> Result<IngestSummary> {
        if drafts.is_empty() {
            tracing::warn!("No news to save");
            return Ok(IngestSummary::default());
        }

        // 現有資料無法解析時中止, 不覆寫
        let mut records = self.read_existing().await?;
        let mut by_link: HashMap<String, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.link.clone(), i))
            .collect();
        let mut max_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        let mut summary = IngestSummary::default();

        for draft in drafts {
            match by_link.get(&draft.link).copied() {
                Some(index) => {
                    let existing = &records[index];
                    let tags = merge_tags(&existing.tags, &draft.tags);
                    let mut updated = NewsRecord::from_draft(existing.id, draft.clone());
                    updated.tags = tags;
                    records[index] = updated;
                    summary.updated += 1;
                }
                None => {
                    max_id += 1;
                    by_link.insert(draft.link.clone(), records.len());
                    records.push(NewsRecord::from_draft(max_id, draft.clone()));
                    summary.inserted += 1;
                }
            }
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, json).await?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn draft(link: &str, title: &str, tags: &[&str]) -> NewsDraft {
        NewsDraft {
            title: title.to_string(),
            source: "Wired".to_string(),
            link: link.to_string(),
            published_at: "2024-01-01".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image_url: String::new(),
            content: None,
        }
    }

    #[tokio::test]
    async fn test_inserts_then_updates_by_link() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("news.json");
        let store = JsonStore::new(&path);

        let first = store
            .save(&[
                draft("https://example.com/a", "A", &["AI"]),
                draft("https://example.com/b", "B", &["Robotics"]),
            ])
            .await
            .unwrap();
        assert_eq!(first, IngestSummary { inserted: 2, updated: 0 });

        let second = store
            .save(&[
                draft("https://example.com/a", "A revised", &["Policy", "AI"]),
                draft("https://example.com/c", "C", &[]),
            ])
            .await
            .unwrap();
        assert_eq!(second, IngestSummary { inserted: 1, updated: 1 });

        let text = std::fs::read_to_string(&path).unwrap();
        let records: Vec<NewsRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].title, "A revised");
        assert_eq!(records[0].tags, vec!["AI", "Policy"]);
        assert_eq!(records[2].id, 3);
    }

    #[tokio::test]
    async fn test_duplicate_links_in_one_batch_collapse() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("news.json"));

        let summary = store
            .save(&[
                draft("https://example.com/a", "A", &["AI"]),
                draft("https://example.com/a", "A again", &["LLM"]),
            ])
            .await
            .unwrap();
        assert_eq!(summary, IngestSummary { inserted: 1, updated: 1 });
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_unreadable_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.json");
        std::fs::write(&path, "{ broken").unwrap();

        let store = JsonStore::new(&path);
        assert!(store.save(&[draft("https://example.com/a", "A", &[])]).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ broken");
    }

    #[tokio::test]
    async fn test_empty_batch_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.json");
        let summary = JsonStore::new(&path).save(&[]).await.unwrap();
        assert_eq!(summary.total(), 0);
        assert!(!path.exists());
    }
}
