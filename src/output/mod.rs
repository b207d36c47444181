//! Output module for the derived artifacts of a crawl
//!
//! This module handles:
//! - Converting advisory HTML into Markdown
//! - Regenerating Markdown from archived HTML
//! - Reporting what a crawl did

mod markdown;
pub mod stats;

pub use markdown::{advisory_to_markdown, create_converter, regenerate_markdown, to_markdown};
pub use stats::{print_report, CrawlReport};
