use crate::utils::error::{NewsError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A single AI-news article as shown in the list and detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub source: String,
    pub link: String,
    pub published_at: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDraft {
    pub title: String,
    #[serde(default)]
    pub source: String,
    pub link: String,
    pub published_at: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NewsRecord {
    pub fn from_draft(id: i64, draft: NewsDraft) -> Self {
        Self {
            id,
            title: draft.title,
            source: draft.source,
            link: draft.link,
            published_at: draft.published_at,
            tags: draft.tags,
            image_url: draft.image_url,
            content: draft.content,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    /// Body text for the detail view. Falls back to a short blurb built from
    /// the title and publisher when the record carries no content.
    pub fn summary(&self) -> String {
        match self.content.as_deref() {
            Some(content) if !content.trim().is_empty() => content.to_string(),
            _ if self.source.is_empty() => format!("{}. The latest AI news report.", self.title),
            _ => format!(
                "{}. The latest AI news report from {}.",
                self.title, self.source
            ),
        }
    }
}

impl Validate for NewsRecord {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)
    }
}

impl Validate for NewsDraft {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)?;
        validate_non_empty_string("link", &self.link)
    }
}

/// Checks a single record, logging why it is rejected.
pub fn is_well_formed(record: &NewsRecord, origin: &str) -> bool {
    match record.validate() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("{}: skipping record {}: {}", origin, record.id, e);
            false
        }
    }
}

/// Drops records that break the dataset invariants: an empty title, or an id
/// already seen earlier in the sequence. Order of the survivors is kept.
pub fn retain_well_formed(records: Vec<NewsRecord>, origin: &str) -> Vec<NewsRecord> {
    let mut seen = HashSet::with_capacity(records.len());

    records
        .into_iter()
        .filter(|record| {
            if !is_well_formed(record, origin) {
                return false;
            }
            if !seen.insert(record.id) {
                tracing::warn!("{}: skipping duplicate record id {}", origin, record.id);
                return false;
            }
            true
        })
        .collect()
}

/// Which adapter backs the news service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// The packaged JSON document.
    #[default]
    Json,
    /// A SQLite database file fetched at runtime.
    Sqlite,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Json => "json",
            DataSource::Sqlite => "sqlite",
        }
    }

    /// Lenient parse for deployment configuration: anything unrecognized
    /// falls back to the packaged dataset.
    pub fn from_config_value(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown data source '{}', falling back to json", value);
            DataSource::Json
        })
    }
}

impl FromStr for DataSource {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(DataSource::Json),
            "sqlite" => Ok(DataSource::Sqlite),
            other => Err(NewsError::InvalidConfigValueError {
                field: "data_source".to_string(),
                value: other.to_string(),
                reason: "expected 'json' or 'sqlite'".to_string(),
            }),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, title: &str) -> NewsRecord {
        NewsRecord {
            id,
            title: title.to_string(),
            source: "TechCrunch".to_string(),
            link: format!("https://example.com/{}", id),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            tags: vec!["AI".to_string()],
            image_url: String::new(),
            content: None,
        }
    }

    #[test]
    fn test_record_uses_camel_case_fields() {
        let json = r#"{
            "id": 7,
            "title": "Open weights model tops leaderboard",
            "source": "The Verge",
            "link": "https://example.com/7",
            "publishedAt": "2024-03-01T08:00:00Z",
            "tags": ["AI", "Open Source"],
            "imageUrl": "https://example.com/7.png"
        }"#;

        let parsed: NewsRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.published_at, "2024-03-01T08:00:00Z");
        assert_eq!(parsed.image_url, "https://example.com/7.png");
        assert_eq!(parsed.tags, vec!["AI", "Open Source"]);
        assert!(parsed.content.is_none());

        let value = serde_json::to_value(&parsed).unwrap();
        assert!(value.get("publishedAt").is_some());
        assert!(value.get("content").is_none());
    }

    #[test]
    fn test_summary_prefers_content() {
        let mut r = record(1, "Chip export rules tighten");
        assert!(r.summary().contains("TechCrunch"));

        r.content = Some(String::new());
        assert!(r.summary().starts_with("Chip export rules tighten"));

        r.content = Some("Full article body".to_string());
        assert_eq!(r.summary(), "Full article body");
    }

    #[test]
    fn test_has_tag_is_case_sensitive() {
        let r = record(1, "t");
        assert!(r.has_tag("AI"));
        assert!(!r.has_tag("ai"));
    }

    #[test]
    fn test_retain_well_formed_drops_blank_titles_and_duplicate_ids() {
        let records = vec![record(1, "a"), record(2, "  "), record(1, "dup"), record(3, "c")];
        let kept = retain_well_formed(records, "test");
        let ids: Vec<i64> = kept.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(kept[0].title, "a");
    }

    #[test]
    fn test_data_source_parsing() {
        assert_eq!("sqlite".parse::<DataSource>().unwrap(), DataSource::Sqlite);
        assert_eq!(" JSON ".parse::<DataSource>().unwrap(), DataSource::Json);
        assert!("postgres".parse::<DataSource>().is_err());
        assert_eq!(DataSource::from_config_value("postgres"), DataSource::Json);
        assert_eq!(DataSource::from_config_value("sqlite"), DataSource::Sqlite);
        assert_eq!(DataSource::default(), DataSource::Json);
    }
}
