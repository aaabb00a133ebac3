use std::time::{Duration, Instant};

use rusty_wordfreq::report;
use rusty_wordfreq::tokenize::{JiebaSegmenter, WhitespaceSegmenter};
use rusty_wordfreq::{AnalysisConfig, AnalysisError, AnalysisSession};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> String {
    format!(
        "<html><head><title>ignored title</title></head><body>\
         <nav>home about contact</nav>{}<footer>footer footer footer</footer></body></html>",
        body
    )
}

async fn mount(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

fn config_for(server: &MockServer, routes: &[&str]) -> AnalysisConfig {
    let mut config = AnalysisConfig::new(routes.iter().map(|r| format!("{}{}", server.uri(), r)));
    config.request_delay_ms = 0;
    config
}

#[tokio::test]
async fn test_batch_skips_failures_and_accumulates() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/one",
        200,
        html("<p>rust parser rust crawler extracts visible text from the page body</p>"),
    )
    .await;
    mount(&server, "/missing", 404, String::new()).await;
    mount(&server, "/empty", 200, html("")).await;
    mount(
        &server,
        "/two",
        200,
        html("<p>another document mentions rust parser once more with enough words</p>"),
    )
    .await;

    let mut config = config_for(&server, &["/one", "/missing", "/empty", "/two"]);
    config.min_freq = 2;
    let session = AnalysisSession::with_segmenter(config, Box::new(WhitespaceSegmenter)).unwrap();
    let outcome = session.run_async().await.unwrap();

    assert_eq!(outcome.stats.requested, 4);
    assert_eq!(outcome.stats.fetch_failures, 1);
    assert_eq!(outcome.stats.extraction_failures, 1);
    assert_eq!(outcome.stats.documents, 2);

    assert_eq!(outcome.table.get("rust"), Some(3));
    assert_eq!(outcome.table.get("parser"), Some(2));
    assert!(!outcome.table.contains("footer"));
    assert!(!outcome.table.contains("home"));
    assert_eq!(outcome.top.pairs(), vec![("rust", 3), ("parser", 2)]);
}

#[tokio::test]
async fn test_table_invariants_hold() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/cn",
        200,
        html("<p>苹果， 苹果， 苹果！ 我们 我们 2024 2024 的 的 a a 新品 新品 发布会 发布会 发布会 测试文本用于验证过滤规则</p>"),
    )
    .await;

    let mut config = config_for(&server, &["/cn"]);
    config.min_freq = 2;
    let session = AnalysisSession::with_segmenter(config, Box::new(JiebaSegmenter::new())).unwrap();
    let outcome = session.run_async().await.unwrap();

    assert_eq!(outcome.table.get("苹果"), Some(3));
    for (token, count) in outcome.table.iter() {
        assert!(token.chars().count() > 1, "short token {}", token);
        assert!(!token.chars().all(char::is_numeric), "numeric token {}", token);
        assert_ne!(token, "我们");
        assert!(count >= 2);
    }
    let top = outcome.top.entries();
    assert!(top.len() <= 20usize.min(outcome.table.len()));
    assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
}

#[tokio::test]
async fn test_empty_result_when_threshold_unmet() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/page",
        200,
        html("<p>every single word on this page appears exactly once only here</p>"),
    )
    .await;

    let mut config = config_for(&server, &["/page"]);
    config.min_freq = 3;
    let session = AnalysisSession::with_segmenter(config, Box::new(WhitespaceSegmenter)).unwrap();
    let result = session.run_async().await;
    assert!(matches!(result, Err(AnalysisError::EmptyResult { min_freq: 3 })));
}

#[tokio::test]
async fn test_requests_are_paced() {
    let server = MockServer::start().await;
    let body = html("<p>paced request body text that is long enough to be accepted as a page</p>");
    for route in ["/a", "/b", "/c"] {
        mount(&server, route, 200, body.clone()).await;
    }

    let mut config = config_for(&server, &["/a", "/b", "/c"]);
    config.request_delay_ms = 150;
    let session = AnalysisSession::with_segmenter(config, Box::new(WhitespaceSegmenter)).unwrap();

    let start = Instant::now();
    let outcome = session.run_async().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(outcome.table.get("paced"), Some(3));
}

#[tokio::test]
async fn test_report_written_from_outcome() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/page",
        200,
        html("<p>report report report writer writer output for the text artifact</p>"),
    )
    .await;

    let mut config = config_for(&server, &["/page"]);
    config.top_n = 1;
    let session = AnalysisSession::with_segmenter(config, Box::new(WhitespaceSegmenter)).unwrap();
    let outcome = session.run_async().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.txt");
    report::write_text(&path, &outcome.table, &outcome.top, 1).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("Distinct tokens: 2"));
    assert!(text.contains("=== Top-1 ==="));
    assert!(text.contains("1     report      3"));
}
