//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawl
//! sessions end-to-end, checking the JSON Lines items and stored images.

use serde_json::Value;
use shutter_sweep::config::load_config;
use shutter_sweep::crawler::run_crawl;
use shutter_sweep::output::CrawlStats;
use shutter_sweep::{RequestOutcome, SweepError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECURSIVE_RULES: &str = r#"
[[rule]]
scope = "div.grid"
parser = "content"

[[rule]]
scope = "nav.pagination"
"#;

/// Writes a configuration file pointing at the mock server
fn write_config(tmp: &TempDir, base_url: &str, mode: &str, extra: &str) -> PathBuf {
    let config = format!(
        r#"
[crawler]
max-concurrent-requests = 4
fetch-timeout-secs = 2
connect-timeout-secs = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
items-path = '{items}'
images-dir = '{images}'

[site]
mode = "{mode}"
start-urls = ["{base_url}/"]
allowed-domains = ["127.0.0.1"]

[selectors]
thumbnail-links = "div.grid figure a.thumb"
image-descriptor = "div.photo img"
title = "div.header h1"
categories = "div.featured span a"

{extra}
"#,
        items = tmp.path().join("items.jl").display(),
        images = tmp.path().join("images").display(),
        mode = mode,
        base_url = base_url,
        extra = extra,
    );

    let path = tmp.path().join("sweep.toml");
    std::fs::write(&path, config).expect("Failed to write config");
    path
}

async fn crawl(config_path: &Path) -> Result<CrawlStats, SweepError> {
    let config = load_config(config_path).expect("Config should be valid");
    run_crawl(config, CancellationToken::new()).await
}

fn read_items(tmp: &TempDir) -> Vec<Value> {
    let content = std::fs::read_to_string(tmp.path().join("items.jl")).unwrap_or_default();
    content
        .lines()
        .map(|line| serde_json::from_str(line).expect("Each line should be JSON"))
        .collect()
}

fn stored_images(tmp: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(tmp.path().join("images"))
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn listing_page(links: &[&str]) -> String {
    let figures: String = links
        .iter()
        .map(|href| format!(r#"<figure><a class="thumb" href="{}">photo</a></figure>"#, href))
        .collect();
    format!(r#"<html><body><div class="grid">{}</div></body></html>"#, figures)
}

fn detail_page(title: &str, categories: &[&str], srcset: &str) -> String {
    let spans: String = categories
        .iter()
        .map(|c| format!("<span><a>{}</a></span>", c))
        .collect();
    format!(
        r#"<html><body>
            <div class="header"><h1>{}</h1></div>
            <div class="featured">{}</div>
            <div class="photo"><img srcset="{}"></div>
        </body></html>"#,
        title, spans, srcset
    )
}

#[tokio::test]
async fn test_single_level_listing_to_detail() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&["/photos/pier", "/photos/pier"])))
        .mount(&mock_server)
        .await;

    let srcset = format!(
        "{0}/img/photo-1?w=1600 1600w, {0}/img/photo-1?w=200 200w, {0}/img/photo-1?w=800 800w",
        base_url
    );
    Mock::given(method("GET"))
        .and(path("/photos/pier"))
        .respond_with(html(detail_page(
            "  Foggy pier ",
            &[" Nature ", "", "Travel"],
            &srcset,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/photo-1"))
        .and(query_param("w", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"small".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/photo-1"))
        .and(query_param("w", "1600"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"large".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config_path = write_config(&tmp, &base_url, "single-level", "");
    let stats = crawl(&config_path).await.expect("Crawl should succeed");

    assert_eq!(stats.count(RequestOutcome::Processed), 2);
    assert_eq!(stats.count(RequestOutcome::Stored), 2);
    assert_eq!(stats.count(RequestOutcome::Duplicate), 1);
    assert_eq!(stats.items_emitted, 1);

    assert_eq!(stored_images(&tmp), ["full_photo-1.jpg", "preview_photo-1.jpg"]);
    let preview = std::fs::read(tmp.path().join("images/preview_photo-1.jpg")).unwrap();
    assert_eq!(preview, b"small");
    let full = std::fs::read(tmp.path().join("images/full_photo-1.jpg")).unwrap();
    assert_eq!(full, b"large");

    let items = read_items(&tmp);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Foggy pier");
    assert_eq!(items[0]["featured_in"], serde_json::json!(["Nature", "Travel"]));
    assert_eq!(
        items[0]["image_urls"],
        Value::String(format!("{}/img/photo-1?w=200", base_url))
    );
}

#[tokio::test]
async fn test_recursive_walk_visits_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <div class="grid">
                    <figure><a class="thumb" href="/photos/a">a</a></figure>
                </div>
                <nav class="pagination"><a href="/page/2">Next</a></nav>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page/2"))
        .respond_with(html(listing_page(&["/photos/b"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // a and b point at each other and at c; c points back at a
    for (page, title, links) in [
        ("/photos/a", "Alpha", vec!["/photos/b", "/photos/c"]),
        ("/photos/b", "Bravo", vec!["/photos/a"]),
        ("/photos/c", "Charlie", vec!["/photos/a", "/photos/a"]),
    ] {
        let figures: String = links
            .iter()
            .map(|href| format!(r#"<figure><a class="thumb" href="{}">x</a></figure>"#, href))
            .collect();
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(format!(
                r#"<html><body>
                    <div class="header"><h1>{}</h1></div>
                    <div class="featured"><span><a>Street</a></span></div>
                    <div class="grid">{}</div>
                </body></html>"#,
                title, figures
            )))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config_path = write_config(&tmp, &base_url, "recursive", RECURSIVE_RULES);
    let stats = crawl(&config_path).await.expect("Crawl should succeed");

    assert_eq!(stats.count(RequestOutcome::Processed), 5);
    assert_eq!(stats.items_emitted, 3);
    assert!(stats.count(RequestOutcome::Duplicate) > 0);
    assert!(stored_images(&tmp).is_empty());

    let items = read_items(&tmp);
    let alpha = items
        .iter()
        .find(|item| item["name"] == "Alpha")
        .expect("Alpha should be emitted");
    assert_eq!(alpha["featured_in"], serde_json::json!(["Street"]));
    assert_eq!(
        alpha["image_urls"],
        serde_json::json!([
            format!("{}/photos/b", base_url),
            format!("{}/photos/c", base_url)
        ])
    );

    let charlie = items.iter().find(|item| item["name"] == "Charlie").unwrap();
    assert_eq!(charlie["image_urls"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_dead_link_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&["/photos/gone", "/photos/here"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/photos/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/photos/here"))
        .respond_with(html(detail_page("Here", &[], "")))
        .mount(&mock_server)
        .await;

    let config_path = write_config(&tmp, &base_url, "single-level", "");
    let stats = crawl(&config_path).await.expect("Crawl should succeed");

    assert_eq!(stats.count(RequestOutcome::DeadLink), 1);
    assert_eq!(stats.count(RequestOutcome::Processed), 2);

    let items = read_items(&tmp);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Here");
    assert!(items[0].get("featured_in").is_none());
    assert!(items[0].get("image_urls").is_none());
}

#[tokio::test]
async fn test_malformed_descriptor_skips_images_only() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&["/photos/broken"])))
        .mount(&mock_server)
        .await;

    let srcset = format!("{0}/img/a.jpg 200w, {0}/img/b.jpg wide", base_url);
    Mock::given(method("GET"))
        .and(path("/photos/broken"))
        .respond_with(html(detail_page("Broken", &["City"], &srcset)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/a.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config_path = write_config(&tmp, &base_url, "single-level", "");
    let stats = crawl(&config_path).await.expect("Crawl should succeed");

    assert_eq!(stats.malformed_descriptors, 1);
    assert_eq!(stats.count(RequestOutcome::Stored), 0);
    assert!(stored_images(&tmp).is_empty());

    let items = read_items(&tmp);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Broken");
    assert_eq!(items[0]["featured_in"], serde_json::json!(["City"]));
    assert!(items[0].get("image_urls").is_none());
}

#[tokio::test]
async fn test_offsite_links_are_not_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url).unwrap().port().unwrap();
    let tmp = TempDir::new().unwrap();

    // Same server, but addressed by a host outside the allowed list
    let offsite = format!("http://localhost:{}/photos/elsewhere", port);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&[offsite.as_str(), "/photos/home"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/photos/elsewhere"))
        .respond_with(html(detail_page("Elsewhere", &[], "")))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/photos/home"))
        .respond_with(html(detail_page("Home", &[], "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config_path = write_config(&tmp, &base_url, "single-level", "");
    let stats = crawl(&config_path).await.expect("Crawl should succeed");

    assert_eq!(stats.count(RequestOutcome::Offsite), 1);
    assert_eq!(read_items(&tmp).len(), 1);
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&["/photos/slow", "/photos/fast"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/photos/slow"))
        .respond_with(html(detail_page("Slow", &[], "")).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/photos/fast"))
        .respond_with(html(detail_page("Fast", &[], "")))
        .mount(&mock_server)
        .await;

    let config_path = write_config(&tmp, &base_url, "single-level", "");
    let stats = crawl(&config_path).await.expect("Crawl should succeed");

    assert_eq!(stats.count(RequestOutcome::TimedOut), 1);
    let items = read_items(&tmp);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Fast");
}

#[tokio::test]
async fn test_cancellation_stops_session() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&["/photos/slow"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/photos/slow"))
        .respond_with(html(detail_page("Slow", &[], "")).set_delay(Duration::from_millis(1500)))
        .mount(&mock_server)
        .await;

    let config_path = write_config(&tmp, &base_url, "single-level", "");
    let config = load_config(&config_path).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let stats = tokio::time::timeout(Duration::from_secs(1), run_crawl(config, cancel))
        .await
        .expect("Cancelled crawl should return promptly")
        .expect("Cancelled crawl is not an error");

    assert!(stats.cancelled);
    assert_eq!(stats.count(RequestOutcome::Processed), 1);
    assert!(read_items(&tmp).is_empty());
}

#[tokio::test]
async fn test_unreachable_seed_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config_path = write_config(&tmp, &base_url, "recursive", RECURSIVE_RULES);
    let result = crawl(&config_path).await;

    assert!(matches!(
        result,
        Err(SweepError::SeedsUnreachable { attempted: 1 })
    ));
}
