//! Run report for a completed crawl
//!
//! This module holds the counters a crawl produces and prints them in the
//! same console format the CLI uses for every subcommand.

use std::time::Duration;

/// Outcome of one successful crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Number of index pages fetched and scanned
    pub pages_scanned: u32,

    /// Whether the previous checkpoint was found during the scan
    pub checkpoint_hit: bool,

    /// Records newer than the checkpoint, in page order
    pub collected: usize,

    /// Advisories downloaded and converted
    pub downloaded: usize,

    /// Checkpoint after the run (`None` if there never was one)
    pub checkpoint: Option<String>,

    /// Total entries in the archive index after the run
    pub indexed: usize,

    pub elapsed: Duration,
}

impl CrawlReport {
    /// Returns true if the run found nothing newer than the checkpoint
    pub fn is_up_to_date(&self) -> bool {
        self.collected == 0
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Discovery:");
    println!("  Index pages scanned: {}", report.pages_scanned);
    println!(
        "  Stopped at checkpoint: {}",
        if report.checkpoint_hit { "yes" } else { "no" }
    );
    println!("  New or updated advisories: {}", report.collected);
    println!();

    println!("Archive:");
    println!("  Advisories downloaded: {}", report.downloaded);
    println!("  Advisories indexed: {}", report.indexed);
    match &report.checkpoint {
        Some(link) => println!("  Checkpoint: {}", link),
        None => println!("  Checkpoint: (none)"),
    }
    println!();

    println!("Completed in {:.2}s", report.elapsed.as_secs_f64());
}
