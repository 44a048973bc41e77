//! Integration tests for the crawler
//!
//! These tests use wiremock to stand up mock HTTP servers and exercise the
//! full session cycle end-to-end: traversal, concurrent analysis, and the
//! completion barrier.

use sitegauge::{CrawlSession, Indexability, SessionConfig};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(max_depth: usize, recursive: bool) -> SessionConfig {
    SessionConfig {
        max_depth,
        recursive,
        concurrent: true,
    }
}

async fn mount_html(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_page_stats() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Two identical internal hrefs and one external one.
    let html = format!(
        r#"<html>
            <head><title>Hi</title></head>
            <body>
                <a href="{base}/about">about</a>
                <a href="{base}/about">about</a>
                <a href="https://elsewhere.example/x">away</a>
            </body>
        </html>"#
    );
    mount_html(&server, "/", html).await;

    let mut session = CrawlSession::new(1, base.clone(), config(1, false));
    session.run().await.unwrap();
    let records = session.report();

    assert_eq!(records.len(), 1);
    let stats = &records[0];
    assert_eq!(stats.title, "Hi");
    assert_eq!(stats.title_length, 2);
    assert_eq!(stats.inlinks, 2);
    assert_eq!(stats.unique_inlinks, 1);
    assert_eq!(stats.outlinks, 1);
    assert_eq!(stats.unique_outlinks, 1);
    assert_eq!(stats.status_code, 200);
    assert_eq!(stats.indexability, Indexability::Indexable);
    assert_eq!(stats.crawl_depth, 1);
    assert_eq!(stats.content_type, "text/html");
    assert_eq!(stats.domain, "127.0.0.1");
}

#[tokio::test]
async fn test_non_recursive_session_fetches_only_seed() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/a">a</a><a href="/b">b</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(&server, "/a", "<html></html>".to_string()).await;
    mount_html(&server, "/b", "<html></html>".to_string()).await;

    let mut session = CrawlSession::new(1, server.uri(), config(2, false));
    session.run().await.unwrap();
    assert_eq!(session.report().len(), 1);
}

#[tokio::test]
async fn test_recursive_crawl_visits_linked_pages_once() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/a">a</a><a href="/b">b</a></body></html>"#.to_string(),
    )
    .await;
    // /a links back to the seed; the repeat visit is suppressed.
    mount_html(
        &server,
        "/a",
        r#"<html><body><a href="/">home</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(&server, "/b", "<html><body>leaf</body></html>".to_string()).await;

    let mut session = CrawlSession::new(1, server.uri(), config(2, true));
    session.run().await.unwrap();
    let records = session.report();

    assert_eq!(records.len(), 3);
    let depths: Vec<usize> = {
        let mut d: Vec<usize> = records.iter().map(|r| r.crawl_depth).collect();
        d.sort_unstable();
        d
    };
    assert_eq!(depths, vec![1, 2, 2]);
}

#[tokio::test]
async fn test_depth_ceiling_stops_traversal() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/a">a</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(
        &server,
        "/a",
        r#"<html><body><a href="/deep">deeper</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(&server, "/deep", "<html></html>".to_string()).await;

    let mut session = CrawlSession::new(1, server.uri(), config(2, true));
    session.run().await.unwrap();
    let records = session.report();

    // /deep would be depth 3, past the ceiling.
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.url.contains("/deep")));
}

#[tokio::test]
async fn test_404_page_is_recorded_non_indexable() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/missing">gone</a></body></html>"#.to_string(),
    )
    .await;
    // No mock for /missing: wiremock answers 404.

    let mut session = CrawlSession::new(1, server.uri(), config(2, true));
    session.run().await.unwrap();
    let records = session.report();

    assert_eq!(records.len(), 2);
    let missing = records
        .iter()
        .find(|r| r.url.ends_with("/missing"))
        .expect("404 page should still produce a record");
    assert_eq!(missing.status_code, 404);
    assert_eq!(missing.indexability, Indexability::NonIndexable);
}

#[tokio::test]
async fn test_allowlist_keeps_traversal_on_seed_host() {
    let server = MockServer::start().await;

    // The external host is never resolved or visited; if the allowlist were
    // ignored the session would stall on a connection attempt and either
    // error-log or produce an extra record.
    mount_html(
        &server,
        "/",
        r#"<html><body><a href="https://elsewhere.example/lured">external</a></body></html>"#
            .to_string(),
    )
    .await;

    let mut session = CrawlSession::new(1, server.uri(), config(3, true));
    session.run().await.unwrap();
    let records = session.report();

    // The external host is counted as an outlink but not traversed.
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outlinks, 1);
    assert_eq!(records[0].unique_outlinks, 1);
}

#[tokio::test]
async fn test_completion_barrier_under_slow_responses() {
    let server = MockServer::start().await;

    let mut links = String::new();
    for i in 0..5 {
        links.push_str(&format!(r#"<a href="/page{i}">p{i}</a>"#));
    }
    mount_html(&server, "/", format!("<html><body>{links}</body></html>")).await;

    for i in 0..5 {
        let body = format!("<html><body>page {i} content here</body></html>");
        Mock::given(method("GET"))
            .and(path(format!("/page{i}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body, "text/html")
                    .set_delay(Duration::from_millis(150)),
            )
            .mount(&server)
            .await;
    }

    let mut session = CrawlSession::new(1, server.uri(), config(2, true));
    session.run().await.unwrap();

    // Every dispatched analysis task must have landed before run returned.
    let records = session.report();
    assert_eq!(records.len(), 6);
    assert!(records
        .iter()
        .filter(|r| r.url.contains("/page"))
        .all(|r| r.response_time_millis >= 100));
}

#[tokio::test]
async fn test_sequential_dispatch_produces_same_records() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/a">a</a><a href="/b">b</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(&server, "/a", "<html></html>".to_string()).await;
    mount_html(&server, "/b", "<html></html>".to_string()).await;

    let mut session = CrawlSession::new(
        1,
        server.uri(),
        SessionConfig {
            max_depth: 2,
            recursive: true,
            concurrent: false,
        },
    );
    session.run().await.unwrap();
    assert_eq!(session.report().len(), 3);
}

#[tokio::test]
async fn test_emails_collected_from_page() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        "<html><body>reach us: sales@example.org or ops@example.org \
         or sales@example.org</body></html>"
            .to_string(),
    )
    .await;

    let mut session = CrawlSession::new(1, server.uri(), config(1, false));
    session.run().await.unwrap();
    let records = session.report();
    assert_eq!(records[0].emails, "sales@example.org;ops@example.org");
}
