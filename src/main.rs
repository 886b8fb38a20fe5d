use ai_news_hub::app::ingest::{
    load_drafts, ConfiguredProvider, IngestConfig, IngestSummary, Ingestor, JsonStore, NewsStore,
    SqliteStore, StorageType,
};
use ai_news_hub::config::cli::{Cli, Command};
use ai_news_hub::utils::{logger, validation::Validate};
use ai_news_hub::{NewsDraft, NewsRecord, NewsService};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let (config, ingest_config) = cli.resolve().context("failed to load configuration")?;
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let service = NewsService::new(&config).context("failed to build news service")?;

    match cli.command {
        Command::List { tag, json } => {
            let records = match &tag {
                Some(tag) => service.get_news_by_tag(tag).await,
                None => service.load_news().await,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    print_summary_line(record);
                }
            }

            if records.is_empty() {
                eprintln!("⚠️  No news found");
            } else {
                eprintln!("✅ Loaded {} articles from {}", records.len(), service.data_source());
            }
        }
        Command::Show { id, json } => match service.get_news_by_id(id).await {
            Some(record) if json => println!("{}", serde_json::to_string_pretty(&record)?),
            Some(record) => print_detail(&record),
            None => {
                eprintln!("❌ News {} not found", id);
                std::process::exit(1);
            }
        },
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&service.status())?);
        }
        Command::Add {
            title,
            link,
            source,
            published_at,
            tags,
            image_url,
            content,
        } => {
            let draft = NewsDraft {
                title,
                source,
                link,
                published_at: published_at.unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
                tags,
                image_url,
                content,
            };
            draft.validate()?;

            if service.add_news(&draft).await {
                println!("✅ Accepted '{}'", draft.title);
            } else {
                eprintln!(
                    "❌ Adding news is not available with the {} data source",
                    service.data_source()
                );
                std::process::exit(1);
            }
        }
        Command::Ingest {
            from_file, output, ..
        } => {
            let summary = match ingest_config.storage_type {
                StorageType::Json => {
                    let path = output.unwrap_or_else(|| ingest_config.json_path.clone());
                    ingest_into(JsonStore::new(path), from_file, &ingest_config).await?
                }
                StorageType::Sqlite => {
                    let path = output.unwrap_or_else(|| ingest_config.db_path.clone());
                    ingest_into(SqliteStore::new(path), from_file, &ingest_config).await?
                }
            };

            println!(
                "✅ Ingestion finished: {} new, {} updated",
                summary.inserted, summary.updated
            );
        }
    }

    Ok(())
}

async fn ingest_into<S: NewsStore>(
    store: S,
    from_file: Option<PathBuf>,
    config: &IngestConfig,
) -> anyhow::Result<IngestSummary> {
    match from_file {
        Some(path) => {
            let drafts = load_drafts(&path)
                .await
                .with_context(|| format!("failed to read drafts from {}", path.display()))?;
            Ok(store.save(&drafts).await?)
        }
        None => {
            let provider = ConfiguredProvider::from_config(config)?;
            Ok(Ingestor::new(provider, store).run(&config.keywords).await?)
        }
    }
}

fn display_date(published_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(published_at)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| published_at.chars().take(10).collect())
}

fn print_summary_line(record: &NewsRecord) {
    let tags = if record.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", record.tags.join(", "))
    };
    let source = if record.source.is_empty() {
        String::new()
    } else {
        format!(" ({})", record.source)
    };

    println!(
        "{:>5}  {}  {}{}{}",
        record.id,
        display_date(&record.published_at),
        record.title,
        source,
        tags
    );
}

fn print_detail(record: &NewsRecord) {
    println!("{}", record.title);
    if !record.source.is_empty() {
        println!("Source: {}", record.source);
    }
    println!("Published: {}", display_date(&record.published_at));
    if !record.tags.is_empty() {
        println!("Tags: {}", record.tags.join(", "));
    }
    if record.has_image() {
        println!("Image: {}", record.image_url);
    }
    println!();
    println!("{}", record.summary());
    println!();
    println!("Read more: {}", record.link);
}
