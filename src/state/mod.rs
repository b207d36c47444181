//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PaginationState`: which index page the discovery phase is on and which
//!   page it will stop after

mod pagination;

// Re-export main types
pub use pagination::{PageBound, PaginationState};
