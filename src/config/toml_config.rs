use crate::app::ingest::{ApiProvider, IngestConfig, StorageType};
use crate::config::NewsConfig;
use crate::domain::model::DataSource;
use crate::utils::error::{NewsError, Result};
use crate::utils::validation::{validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: Option<ServiceSection>,
    pub database: Option<DatabaseSection>,
    pub dataset: Option<DatasetSection>,
    pub ingest: Option<IngestSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSection {
    pub data_source: Option<String>,
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub path: Option<String>,
    pub base_url: Option<String>,
    pub scratch_dir: Option<PathBuf>,
    pub request_timeout_seconds: Option<u64>,
    pub insert_latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSection {
    pub path: Option<PathBuf>,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSection {
    pub keywords: Option<String>,
    pub storage_type: Option<String>,
    pub max_results: Option<usize>,
    pub api_provider: Option<String>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub json_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| NewsError::InvalidConfigValueError {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NEWSAPI_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| NewsError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Service settings: defaults, overridden by whatever the file sets.
    pub fn news_config(&self) -> NewsConfig {
        let mut config = NewsConfig::default();

        if let Some(service) = &self.service {
            if let Some(data_source) = &service.data_source {
                config.data_source = DataSource::from_config_value(data_source);
            }
            if let Some(environment) = &service.environment {
                config.environment = environment.clone();
            }
        }

        if let Some(database) = &self.database {
            if let Some(path) = &database.path {
                config.db_path = path.clone();
            }
            config.base_url = database.base_url.clone().or(config.base_url);
            config.scratch_dir = database.scratch_dir.clone().or(config.scratch_dir);
            config.request_timeout_secs = database.request_timeout_seconds.or(config.request_timeout_secs);
            if let Some(latency) = database.insert_latency_ms {
                config.insert_latency_ms = latency;
            }
        }

        if let Some(dataset) = &self.dataset {
            config.dataset_path = dataset.path.clone().or(config.dataset_path);
            if let Some(latency) = dataset.latency_ms {
                config.json_latency_ms = latency;
            }
        }

        config
    }

    /// Ingestion settings. An unknown storage type is rejected here rather
    /// than silently replaced, since it decides where data gets written.
    pub fn ingest_config(&self) -> Result<IngestConfig> {
        let mut config = IngestConfig::default();

        if let Some(ingest) = &self.ingest {
            if let Some(keywords) = &ingest.keywords {
                config.keywords = IngestConfig::parse_keywords(keywords);
            }
            if let Some(storage_type) = &ingest.storage_type {
                config.storage_type = storage_type.parse::<StorageType>()?;
            }
            if let Some(max_results) = ingest.max_results {
                config.max_results = max_results;
            }
            if let Some(api_provider) = &ingest.api_provider {
                config.api_provider = api_provider.parse::<ApiProvider>()?;
            }
            // an unresolved ${VAR} placeholder means the key is not set
            config.api_key = ingest
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty() && !key.starts_with("${"));
            if let Some(endpoint) = &ingest.endpoint {
                config.endpoint = Some(endpoint.clone());
            }
            if let Some(path) = &ingest.json_path {
                config.json_path = path.clone();
            }
            if let Some(path) = &ingest.db_path {
                config.db_path = path.clone();
            }
        }

        Ok(config)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.news_config().validate()?;
        let ingest = self.ingest_config()?;
        validate_url("ingest.endpoint", ingest.endpoint())
    }
}
