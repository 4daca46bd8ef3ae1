//! Integration tests for the processing pipeline
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! text -> brackets -> fetch -> record cycle end-to-end.

use bracket_fetch::config::ProcessorConfig;
use bracket_fetch::input::{from_chunks, open_input};
use bracket_fetch::output::{Diagnostic, JsonLinesOutput, MemoryOutput, OutputRecord};
use bracket_fetch::processor::{hash_email, process_text, Processor};
use bracket_fetch::state::ProcessorState;
use std::io::Write;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "test-secret";

/// Creates a test configuration with near-instant retries and a short rate limit
fn create_test_config() -> ProcessorConfig {
    ProcessorConfig::fast(SECRET).with_rate_limit_interval(Duration::from_millis(20))
}

/// Returns `localhost:<port>` for the mock server
///
/// Input text has to name the server by host name; bare IP addresses are
/// not recognized as URLs.
fn host(server: &MockServer) -> String {
    format!("localhost:{}", server.address().port())
}

/// Returns the plain-HTTP base URL for the mock server
fn http_base(server: &MockServer) -> String {
    format!("http://{}", host(server))
}

fn html_page(title: &str, extra: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, extra
        ))
        .insert_header("content-type", "text/html")
}

async fn run_with(config: ProcessorConfig, chunks: Vec<String>) -> MemoryOutput {
    let processor = Processor::new(config).expect("Failed to create processor");
    let mut output = MemoryOutput::new();
    processor
        .run(from_chunks(chunks), &mut output)
        .await
        .expect("Run failed");
    output
}

async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

#[tokio::test]
async fn test_bare_host_resolves_title_and_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/google"))
        .respond_with(html_page("Test Title", "Contact: test@example.com"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // No scheme: canonicalized to https, which the plain-HTTP mock server
    // rejects at the handshake, so the first attempt falls back to http
    let input = format!("[{}/google]", host(&mock_server));
    let output = run_with(create_test_config(), vec![input]).await;

    let expected_url = format!("https://{}/google", host(&mock_server));
    assert_eq!(
        output.records,
        vec![OutputRecord {
            url: expected_url,
            title: Some("Test Title".to_string()),
            email_hash: Some(hash_email("test@example.com", SECRET)),
        }]
    );
    assert!(output.diagnostics.is_empty());
}

#[tokio::test]
async fn test_last_url_in_group_wins() {
    let mock_server = MockServer::start().await;
    let base = http_base(&mock_server);

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page("A", ""))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page("B", ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let input = format!("[{}/a {}/b]", base, base);
    let output = run_with(create_test_config(), vec![input]).await;

    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].url, format!("{}/b", base));
    assert_eq!(output.records[0].title.as_deref(), Some("B"));
}

#[tokio::test]
async fn test_scheme_variants_fetched_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/once"))
        .respond_with(html_page("Once", ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = host(&mock_server);
    let output = run_with(
        create_test_config(),
        vec![format!("[{}/once]", h), format!(" and [https://{}/once]", h)],
    )
    .await;

    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].url, format!("https://{}/once", h));
}

#[tokio::test]
async fn test_retry_after_503_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html_page("Success", ""))
        .mount(&mock_server)
        .await;

    let url = format!("{}/flaky", http_base(&mock_server));
    let output = run_with(create_test_config(), vec![format!("[{}]", url)]).await;

    assert_eq!(request_count(&mock_server, "/flaky").await, 2);
    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].title.as_deref(), Some("Success"));
    assert_eq!(output.diagnostics.len(), 1);
    assert!(matches!(
        &output.diagnostics[0],
        Diagnostic::RetryScheduled { url: u, .. } if *u == url
    ));
}

#[tokio::test]
async fn test_retry_failure_emits_url_only_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let url = format!("{}/down", http_base(&mock_server));
    let output = run_with(create_test_config(), vec![format!("[{}]", url)]).await;

    assert_eq!(output.records, vec![OutputRecord::url_only(url.clone())]);
    assert_eq!(output.diagnostics.len(), 2);
    assert!(matches!(
        &output.diagnostics[0],
        Diagnostic::RetryScheduled { .. }
    ));
    assert_eq!(
        output.diagnostics[1],
        Diagnostic::FinalFailure {
            url,
            cause: "HTTP status 503".to_string(),
        }
    );
}

#[tokio::test]
async fn test_retry_never_downgrades_protocol() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html_page("Success", ""))
        .mount(&mock_server)
        .await;

    // First attempt: https fails, falls back to http, gets 503.
    // Retry: https fails and is not allowed to fall back.
    let input = format!("[{}/flaky]", host(&mock_server));
    let output = run_with(create_test_config(), vec![input]).await;

    assert_eq!(request_count(&mock_server, "/flaky").await, 1);
    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].title, None);
    assert!(matches!(
        output.diagnostics.last(),
        Some(Diagnostic::FinalFailure { .. })
    ));
}

#[tokio::test]
async fn test_rate_limit_between_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_page("Page", ""))
        .expect(2)
        .mount(&mock_server)
        .await;

    let interval = Duration::from_millis(300);
    let config = create_test_config().with_rate_limit_interval(interval);
    let base = http_base(&mock_server);

    let start = Instant::now();
    let output = run_with(config, vec![format!("[{}/one] [{}/two]", base, base)]).await;

    assert!(start.elapsed() >= interval);
    let expected = vec![format!("{}/one", base), format!("{}/two", base)];
    assert_eq!(output.urls(), expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_redirects_followed() {
    let mock_server = MockServer::start().await;
    let base = http_base(&mock_server);

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html_page("Moved Here", ""))
        .mount(&mock_server)
        .await;

    let output = run_with(create_test_config(), vec![format!("[{}/old]", base)]).await;

    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].url, format!("{}/old", base));
    assert_eq!(output.records[0].title.as_deref(), Some("Moved Here"));
}

#[tokio::test]
async fn test_timeout_counts_as_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("Slow", "").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let config = create_test_config().with_fetch_timeout(Duration::from_millis(200));
    let url = format!("{}/slow", http_base(&mock_server));
    let output = run_with(config, vec![format!("[{}]", url)]).await;

    assert_eq!(output.records, vec![OutputRecord::url_only(url)]);
    assert!(matches!(
        &output.diagnostics[1],
        Diagnostic::FinalFailure { cause, .. } if cause == "request timed out"
    ));
}

#[tokio::test]
async fn test_page_without_title_or_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nothing to see"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/plain", http_base(&mock_server));
    let output = run_with(create_test_config(), vec![format!("[{}]", url)]).await;

    assert_eq!(output.records, vec![OutputRecord::url_only(url)]);
    assert!(output.diagnostics.is_empty());
}

#[tokio::test]
async fn test_bracket_split_across_chunks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/split"))
        .respond_with(html_page("Split", ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = format!("noise [{}/split] noise", http_base(&mock_server));
    let chunks: Vec<String> = text.chars().map(|c| c.to_string()).collect();
    let output = run_with(create_test_config(), chunks).await;

    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].title.as_deref(), Some("Split"));
}

#[tokio::test]
async fn test_completion_signalled_once_after_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config().with_retry_delay(Duration::from_millis(200));
    let processor = Processor::new(config).expect("Failed to create processor");
    let mut states = processor.subscribe();
    let mut output = MemoryOutput::new();

    let input = from_chunks(vec![format!("[{}/fail]", http_base(&mock_server))]);
    let run = processor.run(input, &mut output);
    let watch = async {
        let mut seen = Vec::new();
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            seen.push(state);
            if state.is_terminal() {
                break;
            }
        }
        seen
    };

    let (summary, seen) = tokio::join!(run, watch);
    let summary = summary.expect("Run failed");

    assert_eq!(seen.last(), Some(&ProcessorState::Complete));
    assert_eq!(
        seen.iter()
            .filter(|s| **s == ProcessorState::Complete)
            .count(),
        1
    );
    assert_eq!(summary.records_emitted, 1);
    assert_eq!(summary.final_failures, 1);
}

#[tokio::test]
async fn test_file_input_to_json_lines() {
    let mock_server = MockServer::start().await;
    let base = http_base(&mock_server);

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(html_page("First", "mail me: first@example.com"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(html_page("Second", ""))
        .mount(&mock_server)
        .await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "Intro [{base}/first] then \\[{base}/escaped] and ] and [ref: {base}/second]\n[unterminated {base}/never",
        base = base
    )
    .unwrap();
    file.flush().unwrap();

    let processor = Processor::new(create_test_config()).expect("Failed to create processor");
    let input = open_input(Some(file.path())).await.expect("Failed to open input");
    let mut output = JsonLinesOutput::new(Vec::new());
    let summary = processor.run(input, &mut output).await.expect("Run failed");
    assert_eq!(summary.records_emitted, 2);

    let text = String::from_utf8(output.into_inner()).unwrap();
    let records: Vec<OutputRecord> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, format!("{}/first", base));
    assert_eq!(
        records[0].email_hash,
        Some(hash_email("first@example.com", SECRET))
    );
    assert_eq!(records[1].url, format!("{}/second", base));
    assert_eq!(records[1].email_hash, None);
    assert!(text.ends_with('\n'));
}

#[tokio::test]
async fn test_process_text_convenience() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whole"))
        .respond_with(html_page("Whole", ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut output = MemoryOutput::new();
    let text = format!("[nothing here] [{}/whole]", http_base(&mock_server));
    let summary = process_text(create_test_config(), &text, &mut output)
        .await
        .expect("Run failed");

    assert_eq!(summary.urls_scheduled, 1);
    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].title.as_deref(), Some("Whole"));
}
