use crate::app::ingest::merge_tags;
use crate::app::ingest::provider::{fetch_json, published_or_now, SearchProvider};
use crate::domain::model::NewsDraft;
use crate::utils::error::{NewsError, Result};
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200/3b82f6/ffffff?text=Tech+News";
const REMOVED_TITLE: &str = "[Removed]";
const SUMMARY_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    source: Option<ArticleSource>,
    url: Option<String>,
    published_at: Option<String>,
    url_to_image: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// Client for a NewsAPI-style `everything` search endpoint.
#[derive(Debug, Clone)]
pub struct NewsApiProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    page_size: usize,
}

impl NewsApiProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, page_size: usize) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            page_size,
        }
    }
}

impl SearchProvider for NewsApiProvider {
    fn name(&self) -> &'static str {
        "newsapi"
    }

    async fn search(&self, keyword: &str) -> Result<Vec<NewsDraft>> {
        tracing::debug!("Making NewsAPI request to: {} (q={})", self.endpoint, keyword);

        let page_size = self.page_size.to_string();
        let request = self
            .client
            .get(&self.endpoint)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", keyword),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ]);

        let body: SearchResponse = fetch_json(request, &self.endpoint).await?;
        if body.status != "ok" {
            return Err(NewsError::ProviderError {
                message: body.message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let drafts: Vec<NewsDraft> = body
            .articles
            .into_iter()
            .filter_map(|article| to_draft(article, keyword))
            .collect();

        tracing::info!("NewsAPI returned {} articles for '{}'", drafts.len(), keyword);
        Ok(drafts)
    }
}

fn to_draft(article: Article, keyword: &str) -> Option<NewsDraft> {
    let title = article.title.unwrap_or_default();
    if title == REMOVED_TITLE {
        return None;
    }

    let content = article
        .description
        .filter(|d| !d.is_empty())
        .map(|d| format!("{}...", d.chars().take(SUMMARY_CHARS).collect::<String>()));

    Some(NewsDraft {
        title,
        source: article.source.and_then(|s| s.name).unwrap_or_default(),
        link: article.url.unwrap_or_default(),
        published_at: published_or_now(article.published_at),
        tags: merge_tags(&[keyword.to_string()], &["AI".to_string()]),
        image_url: article
            .url_to_image
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        content,
    })
}
