//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to create mock HTTP servers and run full
//! harvests end-to-end into a temporary SQLite database.

use std::collections::HashSet;
use std::time::Duration;
use title_harvest::config::{Config, CrawlerConfig, OutputConfig};
use title_harvest::crawler::{harvest, FetchErrorKind};
use title_harvest::storage::SqliteStorage;
use title_harvest::HarvestError;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given URLs and database
fn create_test_config(urls: Vec<String>, db_path: &str, concurrency: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            concurrency,
            request_timeout_secs: 5,
            user_agent: "TestHarvester/1.0".to_string(),
            ..CrawlerConfig::default()
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        urls,
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

fn stored_pairs(db_path: &std::path::Path) -> HashSet<(String, String)> {
    let storage = SqliteStorage::new(db_path).expect("Failed to open DB");
    storage
        .recent_items(1000)
        .expect("Failed to read items")
        .into_iter()
        .map(|item| (item.title, item.url))
        .collect()
}

#[tokio::test]
async fn test_mixed_success_failure_and_fallback() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // One matching story link
    Mock::given(method("GET"))
        .and(path("/A.html"))
        .respond_with(html(
            r#"<html><head><title>Page A</title></head><body>
            <span class="titleline"><a href="/f">Foo</a></span>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    // Server error
    Mock::given(method("GET"))
        .and(path("/B.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    // No story links, only a page title
    Mock::given(method("GET"))
        .and(path("/C.html"))
        .respond_with(html(
            r#"<html><head><title>Bar</title></head><body><p>nothing here</p></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("scenario.db");

    let a = format!("{}/A.html", base_url);
    let b = format!("{}/B.html", base_url);
    let c = format!("{}/C.html", base_url);
    let config = create_test_config(
        vec![a.clone(), b.clone(), c.clone()],
        db_path.to_str().unwrap(),
        2,
    );

    let report = harvest(&config, CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(report.urls_total, 3);
    assert_eq!(report.urls_attempted, 3);
    assert_eq!(report.items_persisted, 2);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.fetch_errors[0].url, b);
    assert_eq!(report.fetch_errors[0].kind, FetchErrorKind::Status(500));
    assert!(!report.cancelled);

    let expected: HashSet<(String, String)> = [
        ("Foo".to_string(), "/f".to_string()),
        ("Bar".to_string(), c.clone()),
    ]
    .into_iter()
    .collect();
    assert_eq!(stored_pairs(&db_path), expected);
}

#[tokio::test]
async fn test_repeated_runs_append_duplicates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(
            r#"<span class="titleline"><a href="/x">X</a></span>"#,
        ))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("repeat.db");
    let config = create_test_config(
        vec![format!("{}/", mock_server.uri())],
        db_path.to_str().unwrap(),
        1,
    );

    for _ in 0..2 {
        harvest(&config, CancellationToken::new())
            .await
            .expect("Harvest failed");
    }

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_items().unwrap(), 2);
    assert_eq!(storage.count_distinct_urls().unwrap(), 1);
}

#[tokio::test]
async fn test_many_pages_all_persisted() {
    let mock_server = MockServer::start().await;

    let listing: String = (0..30)
        .map(|i| format!(r#"<span class="titleline"><a href="/item?id={i}">Story {i}</a></span>"#))
        .collect();
    Mock::given(method("GET"))
        .respond_with(html(&listing))
        .expect(12)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("many.db");
    let urls: Vec<String> = (1..=12)
        .map(|p| format!("{}/news?p={}", mock_server.uri(), p))
        .collect();
    let config = create_test_config(urls, db_path.to_str().unwrap(), 4);

    let report = harvest(&config, CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(report.items_extracted, 360);
    assert_eq!(report.items_persisted, 360);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_items().unwrap(), 360);
    assert_eq!(storage.count_distinct_urls().unwrap(), 30);
}

#[tokio::test]
async fn test_cancellation_stops_new_fetches() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            html("<html><head><title>Slow</title></head></html>")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cancel.db");
    let urls: Vec<String> = (0..20)
        .map(|i| format!("{}/slow/{}", mock_server.uri(), i))
        .collect();
    let config = create_test_config(urls, db_path.to_str().unwrap(), 2);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(10), harvest(&config, token))
        .await
        .expect("Harvest hung after cancellation")
        .expect("Harvest failed");

    assert!(report.cancelled);
    assert_eq!(report.urls_attempted, 2);

    // In-flight fetches ran to completion and were persisted
    assert_eq!(report.items_persisted, 2);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_unopenable_database_is_fatal() {
    let config = create_test_config(
        vec!["http://127.0.0.1:9/".to_string()],
        "/nonexistent/dir/harvest.db",
        1,
    );

    let result = harvest(&config, CancellationToken::new()).await;
    assert!(matches!(result, Err(HarvestError::Storage(_))));
}
