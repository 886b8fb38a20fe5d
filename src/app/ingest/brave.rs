use crate::app::ingest::provider::{fetch_json, published_or_now, SearchProvider};
use crate::domain::model::NewsDraft;
use crate::utils::error::Result;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://api.search.brave.com/res/v1/news/search";

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200/3b82f6/ffffff?text=News";

#[derive(Debug, Deserialize)]
struct NewsSearchResponse {
    #[serde(default)]
    results: Vec<NewsResult>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    page_age: Option<String>,
    meta_url: Option<MetaUrl>,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct MetaUrl {
    hostname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    src: Option<String>,
}

/// Brave Search news endpoint, authenticated with `X-Subscription-Token`.
#[derive(Debug, Clone)]
pub struct BraveProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    count: usize,
}

impl BraveProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, count: usize) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            count,
        }
    }
}

impl SearchProvider for BraveProvider {
    fn name(&self) -> &'static str {
        "brave"
    }

    async fn search(&self, keyword: &str) -> Result<Vec<NewsDraft>> {
        tracing::debug!("Making Brave request to: {} (q={})", self.endpoint, keyword);

        let count = self.count.to_string();
        let request = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", keyword), ("count", count.as_str())]);

        let body: NewsSearchResponse = fetch_json(request, &self.endpoint).await?;
        let drafts: Vec<NewsDraft> = body
            .results
            .into_iter()
            .map(|result| to_draft(result, keyword))
            .collect();

        tracing::info!("Brave returned {} articles for '{}'", drafts.len(), keyword);
        Ok(drafts)
    }
}

fn to_draft(result: NewsResult, keyword: &str) -> NewsDraft {
    NewsDraft {
        title: result.title.unwrap_or_default(),
        source: result
            .meta_url
            .and_then(|meta| meta.hostname)
            .unwrap_or_default(),
        link: result.url.unwrap_or_default(),
        published_at: published_or_now(result.page_age),
        tags: vec![keyword.to_string()],
        image_url: result
            .thumbnail
            .and_then(|t| t.src)
            .filter(|src| !src.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        content: result.description.filter(|d| !d.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::NewsError;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_search_maps_results() {
        let server = MockServer::start();
        let brave_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/res/v1/news/search")
                .header("X-Subscription-Token", "brave-key")
                .query_param("q", "robotics")
                .query_param("count", "3");
            then.status(200).json_body(serde_json::json!({
                "type": "news",
                "results": [
                    {
                        "title": "Warehouse robots get hands",
                        "url": "https://example.com/hands",
                        "description": "Grippers improve.",
                        "page_age": "2024-07-01T08:00:00",
                        "meta_url": {"hostname": "www.theverge.com"},
                        "thumbnail": {"src": "https://imgs.example.com/hands.jpg"}
                    },
                    {"title": "Bare result", "url": "https://example.com/bare"}
                ]
            }));
        });

        let provider = BraveProvider::new(server.url("/res/v1/news/search"), "brave-key", 3);
        let drafts = provider.search("robotics").await.unwrap();
        brave_mock.assert();

        assert_eq!(drafts.len(), 2);
        let first = &drafts[0];
        assert_eq!(first.title, "Warehouse robots get hands");
        assert_eq!(first.source, "www.theverge.com");
        assert_eq!(first.link, "https://example.com/hands");
        assert_eq!(first.published_at, "2024-07-01T08:00:00");
        assert_eq!(first.tags, vec!["robotics"]);
        assert_eq!(first.image_url, "https://imgs.example.com/hands.jpg");
        assert_eq!(first.content.as_deref(), Some("Grippers improve."));

        let bare = &drafts[1];
        assert_eq!(bare.source, "");
        assert_eq!(bare.image_url, PLACEHOLDER_IMAGE);
        assert!(bare.content.is_none());
        assert!(!bare.published_at.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/res/v1/news/search");
            then.status(422);
        });

        let provider = BraveProvider::new(server.url("/res/v1/news/search"), "bad", 3);
        assert!(matches!(
            provider.search("AI").await,
            Err(NewsError::StatusError { status: 422, .. })
        ));
    }
}
