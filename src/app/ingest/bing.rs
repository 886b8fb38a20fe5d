use crate::app::ingest::provider::{fetch_json, published_or_now, SearchProvider};
use crate::domain::model::NewsDraft;
use crate::utils::error::Result;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/news/search";

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200/3b82f6/ffffff?text=News";
const MARKET: &str = "en-US";

#[derive(Debug, Deserialize)]
struct NewsAnswer {
    #[serde(default)]
    value: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsArticle {
    name: Option<String>,
    url: Option<String>,
    description: Option<String>,
    date_published: Option<String>,
    #[serde(default)]
    provider: Vec<Organization>,
    image: Option<Image>,
}

#[derive(Debug, Deserialize)]
struct Organization {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Image {
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Thumbnail {
    content_url: Option<String>,
}

/// Bing News Search v7, authenticated with `Ocp-Apim-Subscription-Key`.
#[derive(Debug, Clone)]
pub struct BingProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    count: usize,
}

impl BingProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, count: usize) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            count,
        }
    }
}

impl SearchProvider for BingProvider {
    fn name(&self) -> &'static str {
        "bing"
    }

    async fn search(&self, keyword: &str) -> Result<Vec<NewsDraft>> {
        tracing::debug!("Making Bing request to: {} (q={})", self.endpoint, keyword);

        let count = self.count.to_string();
        let request = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .query(&[("q", keyword), ("count", count.as_str()), ("mkt", MARKET)]);

        let body: NewsAnswer = fetch_json(request, &self.endpoint).await?;
        let drafts: Vec<NewsDraft> = body
            .value
            .into_iter()
            .map(|article| to_draft(article, keyword))
            .collect();

        tracing::info!("Bing returned {} articles for '{}'", drafts.len(), keyword);
        Ok(drafts)
    }
}

fn to_draft(article: NewsArticle, keyword: &str) -> NewsDraft {
    // only the first listed provider is kept
    let source = article
        .provider
        .into_iter()
        .next()
        .and_then(|org| org.name)
        .unwrap_or_default();

    NewsDraft {
        title: article.name.unwrap_or_default(),
        source,
        link: article.url.unwrap_or_default(),
        published_at: published_or_now(article.date_published),
        tags: vec![keyword.to_string()],
        image_url: article
            .image
            .and_then(|image| image.thumbnail)
            .and_then(|thumb| thumb.content_url)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        content: article.description.filter(|d| !d.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::NewsError;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_search_maps_articles() {
        let server = MockServer::start();
        let bing_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v7.0/news/search")
                .header("Ocp-Apim-Subscription-Key", "bing-key")
                .query_param("q", "LLM")
                .query_param("count", "10")
                .query_param("mkt", "en-US");
            then.status(200).json_body(serde_json::json!({
                "_type": "News",
                "value": [
                    {
                        "name": "Open weights model tops leaderboard",
                        "url": "https://example.com/weights",
                        "description": "A new release.",
                        "datePublished": "2024-09-02T10:15:00.0000000Z",
                        "provider": [{"_type": "Organization", "name": "Reuters"}, {"name": "AP"}],
                        "image": {"thumbnail": {"contentUrl": "https://th.example.com/w.jpg"}}
                    },
                    {"name": "No extras", "url": "https://example.com/plain"}
                ]
            }));
        });

        let provider = BingProvider::new(server.url("/v7.0/news/search"), "bing-key", 10);
        let drafts = provider.search("LLM").await.unwrap();
        bing_mock.assert();

        assert_eq!(drafts.len(), 2);
        let first = &drafts[0];
        assert_eq!(first.title, "Open weights model tops leaderboard");
        assert_eq!(first.source, "Reuters");
        assert_eq!(first.published_at, "2024-09-02T10:15:00.0000000Z");
        assert_eq!(first.tags, vec!["LLM"]);
        assert_eq!(first.image_url, "https://th.example.com/w.jpg");
        assert_eq!(first.content.as_deref(), Some("A new release."));

        let plain = &drafts[1];
        assert_eq!(plain.source, "");
        assert_eq!(plain.image_url, PLACEHOLDER_IMAGE);
        assert!(plain.content.is_none());
    }

    #[tokio::test]
    async fn test_quota_exceeded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v7.0/news/search");
            then.status(403);
        });

        let provider = BingProvider::new(server.url("/v7.0/news/search"), "k", 10);
        assert!(matches!(
            provider.search("AI").await,
            Err(NewsError::StatusError { status: 403, .. })
        ));
    }
}
