use crate::app::ingest::{ApiProvider, IngestConfig, StorageType};
use crate::config::toml_config::TomlConfig;
use crate::config::NewsConfig;
use crate::domain::model::DataSource;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ai-news-hub")]
#[command(about = "Browse AI news from the packaged dataset or a SQLite snapshot")]
pub struct Cli {
    #[arg(long, short, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Data source: json or sqlite")]
    pub data_source: Option<DataSource>,

    #[arg(long, global = true, help = "Location of the SQLite database file")]
    pub db_path: Option<String>,

    #[arg(long, global = true, help = "Base URL relative database paths are resolved against")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "JSON dataset file replacing the bundled one")]
    pub dataset: Option<PathBuf>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List news in the order the data source returns it
    List {
        #[arg(long, help = "Only show news carrying this exact tag")]
        tag: Option<String>,

        #[arg(long, help = "Print records as JSON")]
        json: bool,
    },

    /// Show a single article
    Show {
        id: i64,

        #[arg(long, help = "Print the record as JSON")]
        json: bool,
    },

    /// Print the data source status
    Status,

    /// Submit an article (sqlite data source only)
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        link: String,

        #[arg(long, default_value = "")]
        source: String,

        #[arg(long, help = "Publish time, defaults to now")]
        published_at: Option<String>,

        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        #[arg(long, default_value = "")]
        image_url: String,

        #[arg(long)]
        content: Option<String>,
    },

    /// Fetch articles and upsert them into the dataset files
    Ingest {
        #[arg(long, help = "Read drafts from a JSON file instead of querying the news API")]
        from_file: Option<PathBuf>,

        #[arg(long, help = "Comma separated search keywords")]
        keywords: Option<String>,

        #[arg(long, help = "Where to write: json or sqlite")]
        storage_type: Option<StorageType>,

        #[arg(long = "api", short = 'a', help = "Search provider: newsapi, brave or bing")]
        api: Option<ApiProvider>,

        #[arg(long, help = "Output file, overrides the configured path")]
        output: Option<PathBuf>,

        #[arg(long, help = "Key for the search provider")]
        api_key: Option<String>,
    },
}

impl Cli {
    /// Layers configuration: file, then environment, then flags. The search
    /// key comes from the selected provider's own variable, e.g. `BRAVE_API_KEY`.
    pub fn resolve(&self) -> Result<(NewsConfig, IngestConfig)> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        let mut news = file.news_config();
        news.apply_env();
        self.apply_overrides(&mut news);

        let mut ingest = file.ingest_config()?;
        let mut api_key_flag = None;
        if let Command::Ingest {
            keywords,
            storage_type,
            api,
            api_key,
            ..
        } = &self.command
        {
            if let Some(keywords) = keywords {
                ingest.keywords = IngestConfig::parse_keywords(keywords);
            }
            if let Some(storage_type) = storage_type {
                ingest.storage_type = *storage_type;
            }
            if let Some(api) = api {
                ingest.api_provider = *api;
            }
            api_key_flag = api_key.clone();
        }
        if let Some(key) = ingest.api_provider.key_from_env() {
            ingest.api_key = Some(key);
        }
        if let Some(key) = api_key_flag {
            ingest.api_key = Some(key);
        }

        Ok((news, ingest))
    }

    fn apply_overrides(&self, config: &mut NewsConfig) {
        if let Some(data_source) = self.data_source {
            config.data_source = data_source;
        }
        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(dataset) = &self.dataset {
            config.dataset_path = Some(dataset.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "ai-news-hub",
            "--data-source",
            "sqlite",
            "--db-path",
            "/news.db",
            "--base-url",
            "http://localhost:5173/",
            "list",
            "--tag",
            "AI",
        ])
        .unwrap();

        let (news, _) = cli.resolve().unwrap();
        assert_eq!(news.data_source, DataSource::Sqlite);
        assert_eq!(news.db_path, "/news.db");
        assert_eq!(news.base_url.as_deref(), Some("http://localhost:5173/"));
        assert!(matches!(cli.command, Command::List { tag: Some(ref t), .. } if t == "AI"));
    }

    #[test]
    fn test_rejects_unknown_data_source_flag() {
        let parsed = Cli::try_parse_from(["ai-news-hub", "--data-source", "redis", "status"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_ingest_flags() {
        let cli = Cli::try_parse_from([
            "ai-news-hub",
            "ingest",
            "--keywords",
            "LLM, agents",
            "--storage-type",
            "sqlite",
            "--api-key",
            "abc",
        ])
        .unwrap();

        let (_, ingest) = cli.resolve().unwrap();
        assert_eq!(ingest.keywords, vec!["LLM", "agents"]);
        assert_eq!(ingest.storage_type, StorageType::Sqlite);
        assert_eq!(ingest.api_provider, ApiProvider::NewsApi);
        assert_eq!(ingest.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_ingest_provider_flag() {
        let cli = Cli::try_parse_from(["ai-news-hub", "ingest", "-a", "bing", "--api-key", "k"])
            .unwrap();

        let (_, ingest) = cli.resolve().unwrap();
        assert_eq!(ingest.api_provider, ApiProvider::Bing);
        assert_eq!(ingest.endpoint(), "https://api.bing.microsoft.com/v7.0/news/search");
        assert_eq!(ingest.api_key.as_deref(), Some("k"));

        let parsed = Cli::try_parse_from(["ai-news-hub", "ingest", "--api", "zhipu"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_add_tags_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "ai-news-hub",
            "add",
            "--title",
            "t",
            "--link",
            "https://example.com/t",
            "--tags",
            "AI,Policy",
        ])
        .unwrap();

        match cli.command {
            Command::Add { tags, .. } => assert_eq!(tags, vec!["AI", "Policy"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
