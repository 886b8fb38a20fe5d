pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{Dataset, DbLocation, JsonNewsSource, SqliteNewsSource};
pub use config::{toml_config::TomlConfig, NewsConfig};
pub use crate::core::{DataSource, NewsDraft, NewsRecord, NewsService, NewsSource, ServiceStatus};
pub use utils::error::{NewsError, Result};
