//! End-to-end checks of retry and dry-run behavior over a loopback HTTP server.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use steward::api::RestClient;
use steward::auth::{StaticToken, TokenFile};
use steward::config::ServicesConfig;
use steward::dryrun::DryRunReport;
use steward::error::FailureKind;
use steward::exec::{BackoffPolicy, Outcome, RecordingObserver, RetryExecutor, RetryPolicy};
use steward::services::Workspace;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves one scripted raw response per connection and records request lines.
/// An empty response closes the connection without replying.
async fn scripted_server(responses: Vec<String>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    tokio::spawn(async move {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let request = read_request(&mut stream).await;
            let line = request.lines().next().unwrap_or_default().to_string();
            log.lock().unwrap().push(line);
            if response.is_empty() {
                // Hang up without answering.
                drop(stream);
                continue;
            }
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    (format!("http://{addr}"), seen)
}

/// Read headers and a `Content-Length` body so the client never sees a reset.
async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&data).into_owned();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let body_len = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        if data.len() >= header_end + 4 + body_len {
            break;
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn json_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

fn throttled(retry_after_secs: u64) -> String {
    format!(
        "HTTP/1.1 429 Too Many Requests\r\nRetry-After: {retry_after_secs}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    )
}

fn endpoints(base: &str) -> ServicesConfig {
    ServicesConfig {
        drive_base_url: format!("{base}/drive/v3"),
        drive_upload_url: format!("{base}/upload/drive/v3"),
        sheets_base_url: format!("{base}/v4"),
        mail_base_url: format!("{base}/gmail/v1"),
    }
}

fn fast_backoff() -> BackoffPolicy {
    BackoffPolicy::new(Duration::from_millis(10), Duration::from_millis(50), 0.0)
}

#[tokio::test]
async fn read_recovers_after_throttling_and_waits_the_hinted_delay() {
    let (base, seen) = scripted_server(vec![
        throttled(1),
        json_response(r#"{"range":"Sheet1!A1:B1","values":[["a","b"]]}"#),
    ])
    .await;
    let observer = Arc::new(RecordingObserver::default());
    let executor = RetryExecutor::new(
        RetryPolicy::default(),
        fast_backoff(),
        Arc::new(StaticToken::new("token")),
    )
    .with_observer(observer.clone());
    let ws = Workspace::new(
        Arc::new(RestClient::new(Duration::from_secs(5))),
        executor,
        endpoints(&base),
    );

    let started = Instant::now();
    let rows = ws.sheets().read_range("s1", "Sheet1!A1:B1").await.unwrap();
    assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(observer.waits(), vec![Duration::from_secs(1)]);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn read_recovers_after_dropped_connection() {
    let (base, seen) = scripted_server(vec![
        String::new(),
        json_response(r#"{"id":"f1","name":"notes.txt","mimeType":"text/plain"}"#),
    ])
    .await;
    let observer = Arc::new(RecordingObserver::default());
    let executor = RetryExecutor::new(
        RetryPolicy::default(),
        fast_backoff(),
        Arc::new(StaticToken::new("token")),
    )
    .with_observer(observer.clone());
    let ws = Workspace::new(
        Arc::new(RestClient::new(Duration::from_secs(5))),
        executor,
        endpoints(&base),
    );

    let file = ws.drive().get_file("f1").await.unwrap();
    assert_eq!(file.name, "notes.txt");
    let records = observer.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].outcome, Outcome::TransientFailure);
    assert_eq!(records[1].outcome, Outcome::Success);
    assert_eq!(records[1].index, 2);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn throttled_write_is_not_repeated() {
    let (base, seen) = scripted_server(vec![throttled(0), json_response(r#"{"id":"m1"}"#)]).await;
    let executor = RetryExecutor::new(
        RetryPolicy::default(),
        fast_backoff(),
        Arc::new(StaticToken::new("token")),
    );
    let ws = Workspace::new(
        Arc::new(RestClient::new(Duration::from_secs(5))),
        executor,
        endpoints(&base),
    );

    let err = ws
        .mail()
        .send_message(&["a@example.com".to_string()], "s", "b", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transient);
    assert!(err.to_string().contains("1 attempt"));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn simulated_update_only_reads() {
    let (base, seen) =
        scripted_server(vec![json_response(r#"{"properties":{"title":"Budget"}}"#)]).await;
    let executor = RetryExecutor::new(
        RetryPolicy::default(),
        fast_backoff(),
        Arc::new(StaticToken::new("token")),
    );
    let ws = Workspace::new(
        Arc::new(RestClient::new(Duration::from_secs(5))),
        executor,
        endpoints(&base),
    );

    let values = vec![vec!["1".to_string(); 3]; 2];
    let first = ws
        .sheets()
        .update_range("s1", "A1:C2", values, true)
        .await
        .unwrap();
    let Some(DryRunReport::UpdateRange { title, cells, .. }) = first.report() else {
        panic!("expected update-range preview");
    };
    assert_eq!(title, "Budget");
    assert_eq!(*cells, 6);

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET "), "{requests:?}");
}

#[tokio::test]
async fn missing_token_file_fails_before_any_request() {
    let (base, seen) = scripted_server(vec![json_response("{}")]).await;
    let executor = RetryExecutor::new(
        RetryPolicy::default(),
        fast_backoff(),
        Arc::new(TokenFile::new(PathBuf::from("/nonexistent/steward/token.json"))),
    );
    let ws = Workspace::new(
        Arc::new(RestClient::new(Duration::from_secs(5))),
        executor,
        endpoints(&base),
    );

    let err = ws.drive().get_file("f1").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Configuration);
    assert!(seen.lock().unwrap().is_empty());
}
