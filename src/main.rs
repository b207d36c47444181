//! Advisory-Harvest main entry point
//!
//! This is the command-line interface for the advisory harvester.

use advisory_harvest::config::{load_config, validate, Config};
use advisory_harvest::crawler::crawl;
use advisory_harvest::output::{print_report, regenerate_markdown};
use advisory_harvest::storage::ArchiveLayout;
use advisory_harvest::AdvisoryArchive;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Advisory-Harvest: an incremental security advisory archiver
///
/// Downloads advisories newer than the last run's checkpoint, stores their
/// HTML and Markdown, and searches the resulting archive by title.
#[derive(Parser, Debug)]
#[command(name = "advisory-harvest")]
#[command(version)]
#[command(about = "Incrementally archive security advisories as Markdown", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to an optional TOML configuration file
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Last index page to scan (0 scans every page)
    #[arg(long, global = true, value_name = "PAGES")]
    max_pages: Option<u32>,

    /// Directory holding the archive [default: advisories]
    #[arg(long, global = true, env = "ADVISORY_DIR", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch advisories published or updated since the last run (default)
    Crawl,

    /// Print the Markdown of every archived advisory whose title contains QUERY
    Search {
        /// Case-insensitive text to look for in advisory titles
        query: String,
    },

    /// Regenerate every Markdown file from the archived HTML
    RebuildMarkdown,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    match &cli.command {
        None | Some(Command::Crawl) => handle_crawl(&config).await,
        Some(Command::Search { query }) => handle_search(&config, query).await,
        Some(Command::RebuildMarkdown) => handle_rebuild(&config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("advisory_harvest=info,warn"),
            1 => EnvFilter::new("advisory_harvest=debug,info"),
            2 => EnvFilter::new("advisory_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = max_pages;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.to_string_lossy().into_owned();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    if config.crawl.max_pages == 0 {
        tracing::info!("Scanning up to the last index page");
    } else {
        tracing::info!("Scanning at most up to index page {}", config.crawl.max_pages);
    }
    tracing::info!("Archive directory: {}", config.output.directory);

    match crawl(config).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("crawl failed; checkpoint and index were not updated")
        }
    }
}

/// Handles the search subcommand
async fn handle_search(config: &Config, query: &str) -> anyhow::Result<()> {
    let archive = AdvisoryArchive::open(&config.output.directory)
        .await
        .with_context(|| format!("failed to open archive {}", config.output.directory))?;

    let documents = archive.search(query).await?;
    if documents.is_empty() {
        println!("No advisories match {:?}", query);
        return Ok(());
    }

    for (i, document) in documents.iter().enumerate() {
        if i > 0 {
            println!("\n---\n");
        }
        println!("{}", document.trim_end());
    }

    Ok(())
}

/// Handles the rebuild-markdown subcommand
async fn handle_rebuild(config: &Config) -> anyhow::Result<()> {
    let layout = ArchiveLayout::new(&config.output.directory);
    let written = regenerate_markdown(&layout)
        .await
        .context("failed to regenerate markdown")?;

    println!("✓ Regenerated {} markdown documents", written);
    Ok(())
}
