//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing and detail pages and run the
//! full crawl cycle over real HTTP.

use repo_harvest::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use repo_harvest::crawler::{
    finish_sink, run_crawl, Coordinator, FetchError, Fetcher, HttpFetcher,
};
use repo_harvest::output::{ItemSink, XmlFileSink};
use repo_harvest::{HarvestError, Item};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IDENTITY: &str = "Mozilla/5.0 (X11; Linux x86_64) HarvestTest/1.0";

/// Creates a test configuration pointing at the mock server
fn create_test_config(start_url: String, items_path: &str, delay_ms: u64) -> Config {
    Config {
        crawler: CrawlerConfig {
            start_url,
            download_delay: delay_ms,
            max_concurrent_requests: 4,
            request_timeout: 5,
            deadline: None,
        },
        user_agent: UserAgentConfig {
            identity: IDENTITY.to_string(),
        },
        output: OutputConfig {
            items_path: items_path.to_string(),
        },
    }
}

fn listing_entry(name: &str, description: &str, empty: bool) -> String {
    let marker = if empty {
        r#"<div class="color-fg-muted">This repository is empty.</div>"#
    } else {
        ""
    };
    format!(
        r#"<li class="col-12 d-flex">
             <h3><a href="/alice/{name}" itemprop="name codeRepository"> {name} </a></h3>
             <p class="col-9" itemprop="description">{description}</p>
             {marker}
             <relative-time datetime="2024-04-02T08:00:00Z" class="no-wrap">Apr 2</relative-time>
           </li>"#
    )
}

fn listing_page(entries: &[String], next: Option<&str>) -> String {
    let next = next
        .map(|href| {
            format!(
                r#"<a class="next_page" rel="next" data-test-selector="pagination-next" href="{}">Next</a>"#,
                href
            )
        })
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html><html><head><title>alice</title></head><body>
           <div id="user-repositories-list" data-turbo-frame="repo-list-turbo-frame"><ul>{}</ul></div>
           <div class="paginate-container">{}</div>
           </body></html>"#,
        entries.concat(),
        next
    )
}

fn detail_page(languages: &[&str], commits_markup: &str) -> String {
    let languages: String = languages
        .iter()
        .map(|language| {
            format!(
                r#"<li class="d-inline" itemprop="keywords"><meta itemprop="name" content="{0}"><span>{0}</span></li>"#,
                language
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html><html><body><ul class="list-style-none">{}</ul>{}</body></html>"#,
        languages, commits_markup
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn find<'a>(items: &'a [Item], name: &str) -> &'a Item {
    items
        .iter()
        .find(|item| item.url.ends_with(&format!("/alice/{}", name)))
        .unwrap_or_else(|| panic!("no item named {}", name))
}

#[tokio::test]
async fn test_full_crawl_two_phases() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/alice",
        listing_page(
            &[
                listing_entry("blank", "", true),
                listing_entry("harvest", "  Repository crawler  ", false),
                listing_entry("dotfiles", "   ", false),
            ],
            None,
        ),
    )
    .await;

    mount_html(
        &mock_server,
        "/alice/harvest",
        detail_page(
            &["Rust", "Shell"],
            r#"<a class="Link--primary" href="/alice/harvest/commits/main"><strong>1,024</strong> Commits</a>"#,
        ),
    )
    .await;

    mount_html(
        &mock_server,
        "/alice/dotfiles",
        detail_page(
            &[],
            r#"<a href="/alice/dotfiles/commits/main" aria-label="123 commits">History</a>"#,
        ),
    )
    .await;

    // The empty repository must never be visited
    Mock::given(method("GET"))
        .and(path("/alice/blank"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(format!("{}/alice", base_url), "unused.xml", 0);
    let mut items: Vec<Item> = Vec::new();
    let stats = run_crawl(&config, &mut items).await.expect("Crawl failed");

    assert_eq!(items.len(), 3);
    assert_eq!(stats.listing_pages, 1);
    assert_eq!(stats.detail_pages, 2);
    assert_eq!(stats.empty_items, 1);

    let blank = find(&items, "blank");
    assert!(blank.is_empty);
    assert_eq!(blank.about, "");
    assert_eq!(blank.languages, None);
    assert_eq!(blank.commits, None);
    assert_eq!(blank.url, format!("{}/alice/blank", base_url));

    let harvest = find(&items, "harvest");
    assert_eq!(harvest.about, "Repository crawler");
    assert_eq!(harvest.last_updated.as_deref(), Some("2024-04-02T08:00:00Z"));
    assert_eq!(
        harvest.languages,
        Some(vec!["Rust".to_string(), "Shell".to_string()])
    );
    assert_eq!(harvest.commits, Some(1024));

    let dotfiles = find(&items, "dotfiles");
    assert_eq!(dotfiles.about, "dotfiles");
    assert_eq!(dotfiles.languages, None);
    assert_eq!(dotfiles.commits, Some(123));
}

#[tokio::test]
async fn test_pagination_fetches_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    for page in 1..=3u32 {
        let next = if page < 3 {
            Some(format!("/alice?page={}&tab=repositories", page + 1))
        } else {
            None
        };
        let body = listing_page(
            &[listing_entry(&format!("empty{}", page), "", true)],
            next.as_deref(),
        );

        Mock::given(method("GET"))
            .and(path("/alice"))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", "text/html"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(
        format!("{}/alice?page=1&tab=repositories", base_url),
        "unused.xml",
        0,
    );
    let mut items: Vec<Item> = Vec::new();
    let stats = run_crawl(&config, &mut items).await.expect("Crawl failed");

    assert_eq!(stats.listing_pages, 3);
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.is_empty));
}

#[tokio::test]
async fn test_first_page_failure_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(format!("{}/alice", mock_server.uri()), "unused.xml", 0);
    let mut items: Vec<Item> = Vec::new();
    let result = run_crawl(&config, &mut items).await;

    match result {
        Err(HarvestError::FatalStart { source, .. }) => {
            assert!(matches!(source, FetchError::Http { status: 500, .. }));
        }
        other => panic!("expected FatalStart, got {:?}", other.map(|s| s.items_emitted)),
    }
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_detail_failure_is_not_retried() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/alice",
        listing_page(
            &[
                listing_entry("ok", "fine", false),
                listing_entry("gone", "missing", false),
            ],
            None,
        ),
    )
    .await;
    mount_html(
        &mock_server,
        "/alice/ok",
        detail_page(&["Go"], r#"<div><span>9</span><span>commits</span></div>"#),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/alice/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(format!("{}/alice", mock_server.uri()), "unused.xml", 0);
    let mut items: Vec<Item> = Vec::new();
    let stats = run_crawl(&config, &mut items).await.expect("Crawl failed");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].commits, Some(9));
    assert_eq!(stats.failed_details, 1);
}

#[tokio::test]
async fn test_fetcher_sends_identity_and_honours_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", IDENTITY))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), "unused.xml", 200);
    let fetcher = HttpFetcher::new(&config.fetcher_config()).unwrap();

    let url = url::Url::parse(&format!("{}/any", mock_server.uri())).unwrap();
    let start = Instant::now();
    for _ in 0..3 {
        let page = fetcher.fetch(&url).await.expect("fetch failed");
        assert_eq!(page.status_code, 200);
    }

    assert!(start.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_crawl_writes_xml_feed() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/alice",
        listing_page(
            &[
                listing_entry("blank", "", true),
                listing_entry("web", "Site & blog", false),
            ],
            None,
        ),
    )
    .await;
    mount_html(&mock_server, "/alice/web", detail_page(&["HTML"], "")).await;

    let dir = tempfile::tempdir().unwrap();
    let items_path = dir.path().join("repositories.xml");
    let config = create_test_config(
        format!("{}/alice", mock_server.uri()),
        items_path.to_str().unwrap(),
        0,
    );

    let fetcher = HttpFetcher::new(&config.fetcher_config()).unwrap();
    let coordinator = Coordinator::new(&config.crawler, Arc::new(fetcher)).unwrap();
    let mut sink = XmlFileSink::new(&config.output.items_path);
    coordinator.run(&mut sink).await.expect("Crawl failed");
    sink.finish().unwrap();

    let xml = std::fs::read_to_string(&items_path).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert_eq!(xml.matches("<repository>").count(), 2);
    assert!(xml.contains("<about>Site &amp; blog</about>"));
    assert!(xml.contains("<languages><value>HTML</value></languages>"));
    assert!(xml.contains("<commits>0</commits>"));
    assert_eq!(xml.matches("<commits>").count(), 1);
}

#[tokio::test]
async fn test_fatal_start_keeps_previous_feed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let items_path = dir.path().join("repositories.xml");
    std::fs::write(&items_path, "<repositories>previous run</repositories>").unwrap();

    let config = create_test_config(
        format!("{}/alice", mock_server.uri()),
        items_path.to_str().unwrap(),
        0,
    );
    let mut sink = XmlFileSink::new(&config.output.items_path);
    let outcome = run_crawl(&config, &mut sink).await;
    assert!(matches!(outcome, Err(HarvestError::FatalStart { .. })));

    let finished = finish_sink(&mut sink, Some(&outcome)).unwrap();

    assert!(!finished);
    assert_eq!(
        std::fs::read_to_string(&items_path).unwrap(),
        "<repositories>previous run</repositories>"
    );
}

#[tokio::test]
async fn test_cut_short_crawl_still_writes_feed() {
    let dir = tempfile::tempdir().unwrap();
    let items_path = dir.path().join("repositories.xml");

    let mut sink = XmlFileSink::new(&items_path);
    sink.accept(Item::listed("https://github.com/alice/blank", "", None, true))
        .unwrap();

    let finished = finish_sink(&mut sink, None).unwrap();

    assert!(finished);
    let xml = std::fs::read_to_string(&items_path).unwrap();
    assert_eq!(xml.matches("<repository>").count(), 1);
}
