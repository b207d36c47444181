//! Advisory-Harvest: an incremental security advisory archiver
//!
//! This crate walks a paginated advisory index newest-first, stops at the
//! advisory recorded by the previous run, downloads everything newer, converts
//! each advisory to Markdown and maintains a searchable on-disk archive.

pub mod config;
pub mod crawler;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Advisory-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection failure, timeout or non-success status
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    /// Markup no longer matches what the parser expects
    #[error("HTML parse error in {context}: {message}")]
    Parse { context: String, message: String },

    #[error("Failed to persist {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Advisory {link} is indexed but {} is missing", .path.display())]
    NotFound { link: String, path: PathBuf },

    #[error("Index serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Request gate closed")]
    GateClosed(#[from] tokio::sync::AcquireError),
}

impl HarvestError {
    pub(crate) fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Advisory-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator};
pub use search::AdvisoryArchive;
pub use storage::{AdvisoryRecord, ArchiveIndex};
