use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} while fetching {url}")]
    StatusError { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("News provider error: {message}")]
    ProviderError { message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Database engine unavailable: {message}")]
    EngineError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// Coarse classification used to decide where a failure is absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Fetching the file or document failed, or the server refused it.
    Transport,
    /// The bytes arrived but could not be turned into news records.
    Decode,
    /// The environment the adapter runs in is broken.
    Engine,
    Config,
}

impl ErrorCategory {
    /// Transport and decode failures never cross an adapter boundary.
    pub fn absorbed_by_adapter(self) -> bool {
        matches!(self, ErrorCategory::Transport | ErrorCategory::Decode)
    }
}

impl NewsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NewsError::HttpError(e) if e.is_decode() => ErrorCategory::Decode,
            NewsError::HttpError(_)
            | NewsError::StatusError { .. }
            | NewsError::IoError(_)
            | NewsError::ProviderError { .. } => ErrorCategory::Transport,
            NewsError::SerializationError(_) | NewsError::DatabaseError(_) => {
                ErrorCategory::Decode
            }
            NewsError::ValidationError { .. } => ErrorCategory::Decode,
            NewsError::EngineError { .. } => ErrorCategory::Engine,
            NewsError::ConfigError { .. } | NewsError::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
        }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        NewsError::EngineError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        NewsError::ConfigError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;
