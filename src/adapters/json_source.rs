use crate::adapters::absorb;
use crate::domain::model::{retain_well_formed, NewsRecord};
use crate::domain::ports::NewsSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

const BUNDLED_DATASET: &str = include_str!("../../data/news.json");

pub const DEFAULT_JSON_LATENCY: Duration = Duration::from_millis(500);

/// Where the packaged JSON document comes from.
#[derive(Debug, Clone)]
pub enum Dataset {
    /// The document compiled into the binary.
    Bundled,
    File(PathBuf),
    Inline(String),
}

/// Serves news from a packaged JSON array, in the order it was authored.
#[derive(Debug, Clone)]
pub struct JsonNewsSource {
    dataset: Dataset,
    latency: Duration,
}

impl JsonNewsSource {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            latency: DEFAULT_JSON_LATENCY,
        }
    }

    pub fn bundled() -> Self {
        Self::new(Dataset::Bundled)
    }

    /// Artificial delay applied to every successful load.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn read_document(&self) -> Result<String> {
        match &self.dataset {
            Dataset::Bundled => Ok(BUNDLED_DATASET.to_string()),
            Dataset::File(path) => {
                tracing::debug!("Reading dataset from {}", path.display());
                Ok(tokio::fs::read_to_string(path).await?)
            }
            Dataset::Inline(text) => Ok(text.clone()),
        }
    }

    async fn try_load_all(&self) -> Result<Vec<NewsRecord>> {
        let document = self.read_document().await?;
        let records: Vec<NewsRecord> = serde_json::from_str(&document)?;
        let records = retain_well_formed(records, self.name());

        // 模擬網路延遲
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        tracing::debug!("Loaded {} records from JSON dataset", records.len());
        Ok(records)
    }
}

#[async_trait]
impl NewsSource for JsonNewsSource {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn load_all(&self) -> Result<Vec<NewsRecord>> {
        absorb(self.name(), "load_all", self.try_load_all().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FIXTURE: &str = r#"[
        {"id": 3, "title": "Third", "source": "Wired", "link": "https://example.com/3",
         "publishedAt": "2024-01-03", "tags": ["AI"], "imageUrl": ""},
        {"id": 1, "title": "First", "source": "", "link": "https://example.com/1",
         "publishedAt": "2024-01-01", "tags": ["AI", "Policy"], "imageUrl": "https://example.com/1.png"},
        {"id": 2, "title": "Second", "source": "Ars Technica", "link": "https://example.com/2",
         "publishedAt": "2024-01-02", "tags": ["Robotics"], "imageUrl": "", "content": "Body"}
    ]"#;

    fn inline(text: &str) -> JsonNewsSource {
        JsonNewsSource::new(Dataset::Inline(text.to_string())).with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_load_all_keeps_document_order() {
        let records = inline(FIXTURE).load_all().await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(records[2].content.as_deref(), Some("Body"));
    }

    #[tokio::test]
    async fn test_malformed_document_yields_empty() {
        let records = inline("[{\"id\": 1,").load_all().await.unwrap();
        assert!(records.is_empty());

        let records = inline("{\"not\": \"an array\"}").load_all().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty() {
        let source = JsonNewsSource::new(Dataset::File(PathBuf::from("/nonexistent/news.json")))
            .with_latency(Duration::ZERO);
        assert!(source.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_dataset_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let source = JsonNewsSource::new(Dataset::File(file.path().to_path_buf()))
            .with_latency(Duration::ZERO);
        assert_eq!(source.load_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_tag() {
        let source = inline(FIXTURE);

        let found = source.get_by_id(2).await.unwrap().unwrap();
        assert_eq!(found.title, "Second");
        assert!(source.get_by_id(99).await.unwrap().is_none());

        let tagged = source.get_by_tag("AI").await.unwrap();
        let ids: Vec<i64> = tagged.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(source.get_by_tag("ai").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bundled_dataset_parses() {
        let source = JsonNewsSource::bundled().with_latency(Duration::ZERO);
        let records = source.load_all().await.unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| !r.title.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_waits_for_latency() {
        let source = JsonNewsSource::new(Dataset::Inline(FIXTURE.to_string()));
        let start = tokio::time::Instant::now();
        source.load_all().await.unwrap();
        assert!(start.elapsed() >= DEFAULT_JSON_LATENCY);
    }
}
