//! Configuration module for Advisory-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so a run without a file uses
//! `Config::default()`.
//!
//! # Example
//!
//! ```no_run
//! use advisory_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawl will scan at most page {}", config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, FetcherConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
