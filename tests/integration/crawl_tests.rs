//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a synthetic advisory index and
//! advisory pages, and run full crawls against a temporary output directory.

use advisory_harvest::config::Config;
use advisory_harvest::crawler::Coordinator;
use advisory_harvest::storage::{ArchiveIndex, ArchiveLayout};
use advisory_harvest::{AdvisoryArchive, HarvestError};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_PATH: &str = "/news-events/cybersecurity-advisories";

/// Site-relative link of the advisory with the given slug
fn link(slug: &str) -> String {
    format!("/news-events/alerts/{slug}")
}

/// Renders one index page listing `entries` as (slug, title) pairs
fn index_page(entries: &[(&str, &str)], last_page: Option<u32>) -> String {
    let articles: String = entries
        .iter()
        .map(|(slug, title)| {
            format!(
                r#"<article class="c-teaser">
                     <div class="c-teaser__meta">Cybersecurity Advisory</div>
                     <div class="c-teaser__date"><time>Apr 18, 2024</time></div>
                     <h3 class="c-teaser__title"><a href="{}"><span>{}</span></a></h3>
                   </article>"#,
                link(slug),
                title
            )
        })
        .collect();

    let pager = last_page
        .map(|n| {
            format!(
                r#"<nav class="c-pager"><a class="c-pager__link c-pager__link--last" href="?sort_by=field_last_updated&amp;url=&amp;page={n}">Last</a></nav>"#
            )
        })
        .unwrap_or_default();

    format!("<html><body><main>{articles}</main>{pager}</body></html>")
}

/// Renders an advisory page with a footer that must not reach the Markdown
fn advisory_page(title: &str) -> String {
    format!(
        r#"<html><body>
             <header>Site header</header>
             <main class="c-main">
               <h1>{title}</h1>
               <h2>Technical Details</h2>
               <p>Details of {title}.</p>
               <div class="l-full__footer"><p>Please share your thoughts</p></div>
             </main>
           </body></html>"#
    )
}

async fn mount_index_page(server: &MockServer, page: u32, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("sort_by", "field_last_updated"))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_advisory(server: &MockServer, slug: &str, title: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(link(slug).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(advisory_page(title)))
        .expect(expected)
        .mount(server)
        .await;
}

/// Creates a configuration pointed at the mock server
fn config_for(server: &MockServer, output: &Path, max_pages: u32) -> Config {
    let mut config = Config::default();
    config.site.base_url = server.uri();
    config.site.index_path = INDEX_PATH.to_string();
    config.crawl.max_pages = max_pages;
    config.output.directory = output.to_string_lossy().into_owned();
    config
}

/// Creates a coordinator pointed at the mock server
fn coordinator(server: &MockServer, output: &Path, max_pages: u32) -> Coordinator {
    Coordinator::new(&config_for(server, output, max_pages)).expect("Failed to create coordinator")
}

fn read_checkpoint(output: &Path) -> Option<String> {
    std::fs::read_to_string(output.join("checkpoint.txt")).ok()
}

#[tokio::test]
async fn test_two_page_crawl_from_scratch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_index_page(
        &server,
        0,
        index_page(&[("a", "Advisory A"), ("b", "Advisory B")], Some(1)),
        1,
    )
    .await;
    mount_index_page(&server, 1, index_page(&[("c", "Advisory C")], Some(1)), 1).await;
    mount_advisory(&server, "a", "Advisory A", 1).await;
    mount_advisory(&server, "b", "Advisory B", 1).await;
    mount_advisory(&server, "c", "Advisory C", 1).await;

    let report = coordinator(&server, dir.path(), 0).run().await.unwrap();

    assert_eq!(report.pages_scanned, 2);
    assert_eq!(report.collected, 3);
    assert_eq!(report.downloaded, 3);
    assert!(!report.checkpoint_hit);
    assert_eq!(report.checkpoint, Some(link("a")));

    let layout = ArchiveLayout::new(dir.path());
    for (slug, title) in [("a", "Advisory A"), ("b", "Advisory B"), ("c", "Advisory C")] {
        let html = std::fs::read_to_string(layout.html_path(slug)).unwrap();
        assert_eq!(html, advisory_page(title));

        let markdown = std::fs::read_to_string(layout.markdown_path(slug)).unwrap();
        assert!(markdown.contains(&format!("# {title}")));
        assert!(markdown.contains("## Technical Details"));
        assert!(!markdown.contains("Please share your thoughts"));
        assert!(!markdown.contains("Site header"));
    }

    assert_eq!(read_checkpoint(dir.path()), Some(link("a")));

    let index = ArchiveIndex::load(&layout.index_path()).await.unwrap();
    assert_eq!(index.len(), 3);
    let b = index.get(&link("b")).unwrap();
    assert_eq!(b.title, "Advisory B");
    assert_eq!(b.category, "Cybersecurity Advisory");
    assert_eq!(b.date, "Apr 18, 2024");
}

#[tokio::test]
async fn test_rerun_without_new_advisories_is_idempotent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Page 0 is scanned by both runs, everything else only by the first
    mount_index_page(
        &server,
        0,
        index_page(&[("a", "Advisory A"), ("b", "Advisory B")], Some(1)),
        2,
    )
    .await;
    mount_index_page(&server, 1, index_page(&[("c", "Advisory C")], Some(1)), 1).await;
    mount_advisory(&server, "a", "Advisory A", 1).await;
    mount_advisory(&server, "b", "Advisory B", 1).await;
    mount_advisory(&server, "c", "Advisory C", 1).await;

    coordinator(&server, dir.path(), 0).run().await.unwrap();
    let index_before = std::fs::read(dir.path().join("index.json")).unwrap();
    let checkpoint_before = std::fs::read(dir.path().join("checkpoint.txt")).unwrap();

    let report = coordinator(&server, dir.path(), 0).run().await.unwrap();

    assert_eq!(report.pages_scanned, 1);
    assert!(report.checkpoint_hit);
    assert_eq!(report.collected, 0);
    assert!(report.is_up_to_date());
    assert_eq!(report.checkpoint, Some(link("a")));
    assert_eq!(std::fs::read(dir.path().join("index.json")).unwrap(), index_before);
    assert_eq!(
        std::fs::read(dir.path().join("checkpoint.txt")).unwrap(),
        checkpoint_before
    );
}

#[tokio::test]
async fn test_stop_rule_collects_records_before_checkpoint() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("checkpoint.txt"), link("e")).unwrap();

    mount_index_page(&server, 0, index_page(&[("a", "A"), ("b", "B")], Some(9)), 1).await;
    mount_index_page(
        &server,
        1,
        index_page(&[("c", "C"), ("d", "D"), ("e", "E"), ("f", "F")], Some(9)),
        1,
    )
    .await;
    // The site has more pages, but the checkpoint ends the scan on page 1
    mount_index_page(&server, 2, index_page(&[("g", "G")], Some(9)), 0).await;

    let coordinator = coordinator(&server, dir.path(), 25);
    let discovery = coordinator.discover(Some(link("e").as_str())).await.unwrap();
    let links: Vec<&str> = discovery.records.iter().map(|r| r.link.as_str()).collect();
    assert_eq!(links, vec![link("a"), link("b"), link("c"), link("d")]);
    assert_eq!(discovery.pages_scanned, 2);
    assert!(discovery.checkpoint_hit);

    server.verify().await;
    server.reset().await;
    mount_index_page(&server, 0, index_page(&[("a", "A"), ("b", "B")], Some(9)), 1).await;
    mount_index_page(
        &server,
        1,
        index_page(&[("c", "C"), ("d", "D"), ("e", "E"), ("f", "F")], Some(9)),
        1,
    )
    .await;
    mount_index_page(&server, 2, index_page(&[("g", "G")], Some(9)), 0).await;
    for slug in ["a", "b", "c", "d"] {
        mount_advisory(&server, slug, slug, 1).await;
    }
    mount_advisory(&server, "e", "E", 0).await;
    mount_advisory(&server, "f", "F", 0).await;

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.collected, 4);
    assert_eq!(read_checkpoint(dir.path()), Some(link("a")));

    let layout = ArchiveLayout::new(dir.path());
    assert!(!layout.markdown_path("e").exists());
    assert!(!layout.markdown_path("f").exists());
}

#[tokio::test]
async fn test_new_advisories_advance_checkpoint() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_index_page(&server, 0, index_page(&[("a", "Advisory A")], Some(0)), 1).await;
    mount_advisory(&server, "a", "Advisory A", 1).await;
    coordinator(&server, dir.path(), 0).run().await.unwrap();
    assert_eq!(read_checkpoint(dir.path()), Some(link("a")));

    // A new advisory and a revision of an older one now sort above "a"
    server.verify().await;
    server.reset().await;
    mount_index_page(
        &server,
        0,
        index_page(
            &[("n", "Advisory N"), ("old", "Advisory Old (Update)"), ("a", "Advisory A")],
            Some(0),
        ),
        1,
    )
    .await;
    mount_advisory(&server, "n", "Advisory N", 1).await;
    mount_advisory(&server, "old", "Advisory Old (Update)", 1).await;
    mount_advisory(&server, "a", "Advisory A", 0).await;

    let report = coordinator(&server, dir.path(), 0).run().await.unwrap();

    assert_eq!(report.collected, 2);
    assert!(report.checkpoint_hit);
    assert_eq!(report.indexed, 3);
    assert_eq!(read_checkpoint(dir.path()), Some(link("n")));
}

#[tokio::test]
async fn test_failed_download_commits_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_index_page(
        &server,
        0,
        index_page(&[("a", "Advisory A"), ("b", "Advisory B")], Some(0)),
        1,
    )
    .await;
    // "a" may or may not be requested before "b" fails
    Mock::given(method("GET"))
        .and(path(link("a").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(advisory_page("Advisory A")))
        .expect(0..=1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(link("b").as_str()))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = coordinator(&server, dir.path(), 0).run().await;

    assert!(matches!(result, Err(HarvestError::Transport { .. })));
    assert_eq!(read_checkpoint(dir.path()), None);
    assert!(!dir.path().join("index.json").exists());
}

#[tokio::test]
async fn test_unparseable_advisory_commits_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_index_page(&server, 0, index_page(&[("a", "Advisory A")], Some(0)), 1).await;
    Mock::given(method("GET"))
        .and(path(link("a").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Moved</body></html>"))
        .mount(&server)
        .await;

    let result = coordinator(&server, dir.path(), 0).run().await;

    assert!(matches!(result, Err(HarvestError::Parse { .. })));
    assert_eq!(read_checkpoint(dir.path()), None);
    assert!(!dir.path().join("index.json").exists());
}

#[tokio::test]
async fn test_unknown_checkpoint_runs_to_page_bound() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("checkpoint.txt"), link("delisted")).unwrap();

    mount_index_page(&server, 0, index_page(&[("a", "A"), ("b", "B")], Some(50)), 1).await;
    mount_index_page(&server, 1, index_page(&[("c", "C")], Some(50)), 1).await;
    mount_index_page(&server, 2, index_page(&[("d", "D")], Some(50)), 0).await;
    for slug in ["a", "b", "c"] {
        mount_advisory(&server, slug, slug, 1).await;
    }

    let report = coordinator(&server, dir.path(), 1).run().await.unwrap();

    assert_eq!(report.pages_scanned, 2);
    assert!(!report.checkpoint_hit);
    assert_eq!(report.collected, 3);
    assert_eq!(read_checkpoint(dir.path()), Some(link("a")));
}

#[tokio::test]
async fn test_empty_index_leaves_archive_untouched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_index_page(&server, 0, index_page(&[], None), 1).await;
    mount_index_page(&server, 1, index_page(&[], None), 0).await;

    let report = coordinator(&server, dir.path(), 0).run().await.unwrap();

    assert_eq!(report.collected, 0);
    assert_eq!(report.checkpoint, None);
    assert_eq!(read_checkpoint(dir.path()), None);
    assert!(!dir.path().join("index.json").exists());
}

#[tokio::test]
async fn test_search_after_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_index_page(
        &server,
        0,
        index_page(&[("foo", "Critical Alert: Foo"), ("bar", "Bar Advisory")], Some(0)),
        1,
    )
    .await;
    mount_advisory(&server, "foo", "Critical Alert: Foo", 1).await;
    mount_advisory(&server, "bar", "Bar Advisory", 1).await;

    coordinator(&server, dir.path(), 0).run().await.unwrap();

    let archive = AdvisoryArchive::open(dir.path()).await.unwrap();
    assert_eq!(archive.len(), 2);

    let documents = archive.search("alert").await.unwrap();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].contains("# Critical Alert: Foo"));

    let expected =
        std::fs::read_to_string(ArchiveLayout::new(dir.path()).markdown_path("foo")).unwrap();
    assert_eq!(documents[0], expected);
}

#[tokio::test]
async fn test_in_flight_requests_respect_limit() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let slugs = ["a", "b", "c", "d", "e", "f"];
    let entries: Vec<(&str, &str)> = slugs.iter().map(|slug| (*slug, "Slow Advisory")).collect();
    mount_index_page(&server, 0, index_page(&entries, Some(0)), 1).await;

    for slug in slugs {
        Mock::given(method("GET"))
            .and(path(link(slug).as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(advisory_page("Slow Advisory"))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut config = config_for(&server, dir.path(), 0);
    config.fetcher.max_concurrent_requests = 2;
    let coordinator = Coordinator::new(&config).unwrap();

    let started = Instant::now();
    let report = coordinator.run().await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.downloaded, 6);
    // Six 300ms responses, two at a time, take at least three rounds
    assert!(
        elapsed >= Duration::from_millis(850),
        "six delayed downloads with two slots finished in {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_corrupt_index_fails_before_downloads() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.json"), "{not json").unwrap();

    mount_index_page(&server, 0, index_page(&[("a", "Advisory A")], Some(0)), 0).await;
    mount_advisory(&server, "a", "Advisory A", 0).await;

    let result = coordinator(&server, dir.path(), 0).run().await;

    assert!(matches!(result, Err(HarvestError::Serialization(_))));
    assert!(!ArchiveLayout::new(dir.path()).html_path("a").exists());
    assert_eq!(read_checkpoint(dir.path()), None);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("index.json")).unwrap(),
        "{not json"
    );
}
