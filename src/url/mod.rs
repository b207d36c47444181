//! URL handling module for Advisory-Harvest
//!
//! This module builds the remote URLs the fetcher requests and derives the
//! on-disk filename stem ("slug") of an advisory from its site-relative link.

mod endpoints;
mod slug;

// Re-export main types and functions
pub use endpoints::SiteEndpoints;
pub use slug::slug_from_link;
