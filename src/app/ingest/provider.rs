use crate::app::ingest::{BingProvider, BraveProvider, IngestConfig, NewsApiProvider};
use crate::domain::model::NewsDraft;
use crate::utils::error::{NewsError, Result};
use chrono::Utc;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;

/// Search backend the ingestion tool queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    #[default]
    NewsApi,
    Brave,
    Bing,
}

impl ApiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiProvider::NewsApi => "newsapi",
            ApiProvider::Brave => "brave",
            ApiProvider::Bing => "bing",
        }
    }

    /// Environment variable holding this provider's key.
    pub fn env_key(&self) -> &'static str {
        match self {
            ApiProvider::NewsApi => "NEWSAPI_KEY",
            ApiProvider::Brave => "BRAVE_API_KEY",
            ApiProvider::Bing => "BING_API_KEY",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ApiProvider::NewsApi => crate::app::ingest::newsapi::DEFAULT_ENDPOINT,
            ApiProvider::Brave => crate::app::ingest::brave::DEFAULT_ENDPOINT,
            ApiProvider::Bing => crate::app::ingest::bing::DEFAULT_ENDPOINT,
        }
    }

    pub fn key_from_env(&self) -> Option<String> {
        let key = std::env::var(self.env_key()).ok().filter(|k| !k.trim().is_empty())?;
        tracing::debug!("Using API key from {}", self.env_key());
        Some(key)
    }
}

impl FromStr for ApiProvider {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newsapi" => Ok(ApiProvider::NewsApi),
            "brave" => Ok(ApiProvider::Brave),
            "bing" => Ok(ApiProvider::Bing),
            other => Err(NewsError::InvalidConfigValueError {
                field: "ingest.api_provider".to_string(),
                value: other.to_string(),
                reason: "expected 'newsapi', 'brave' or 'bing'".to_string(),
            }),
        }
    }
}

impl fmt::Display for ApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword search returning articles ready for a [`NewsStore`](super::NewsStore).
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn search(&self, keyword: &str) -> impl Future<Output = Result<Vec<NewsDraft>>> + Send;
}

/// The provider picked by `ingest.api_provider`.
#[derive(Debug, Clone)]
pub enum ConfiguredProvider {
    NewsApi(NewsApiProvider),
    Brave(BraveProvider),
    Bing(BingProvider),
}

impl ConfiguredProvider {
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        let provider = config.api_provider;
        let api_key = config.api_key.clone().ok_or_else(|| {
            NewsError::config(format!(
                "{} API key is not configured (ingest.api_key or {})",
                provider,
                provider.env_key()
            ))
        })?;
        let endpoint = config.endpoint().to_string();

        Ok(match provider {
            ApiProvider::NewsApi => {
                Self::NewsApi(NewsApiProvider::new(endpoint, api_key, config.max_results))
            }
            ApiProvider::Brave => {
                Self::Brave(BraveProvider::new(endpoint, api_key, config.max_results))
            }
            ApiProvider::Bing => Self::Bing(BingProvider::new(endpoint, api_key, config.max_results)),
        })
    }
}

impl SearchProvider for ConfiguredProvider {
    fn name(&self) -> &'static str {
        match self {
            Self::NewsApi(p) => p.name(),
            Self::Brave(p) => p.name(),
            Self::Bing(p) => p.name(),
        }
    }

    async fn search(&self, keyword: &str) -> Result<Vec<NewsDraft>> {
        match self {
            Self::NewsApi(p) => p.search(keyword).await,
            Self::Brave(p) => p.search(keyword).await,
            Self::Bing(p) => p.search(keyword).await,
        }
    }
}

/// Sends `request` and decodes a JSON body, mapping non-2xx to `StatusError`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    endpoint: &str,
) -> Result<T> {
    let response = request.send().await?;
    tracing::debug!("{} responded with {}", endpoint, response.status());

    if !response.status().is_success() {
        return Err(NewsError::StatusError {
            status: response.status().as_u16(),
            url: endpoint.to_string(),
        });
    }

    Ok(response.json().await?)
}

pub(crate) fn published_or_now(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}
