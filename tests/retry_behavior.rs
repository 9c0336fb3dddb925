//! Retry-loop behavior tests against a scripted transport.
//!
//! These tests pin down the attempt count and the linear backoff schedule
//! exactly, using Tokio's paused clock so sleeps advance virtual time only.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use file_retriever::{
    FetchError, FetchSuccess, FileRetriever, RetrievalRequest, RetrieveError, Transport,
};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tracing::Level;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Transport that replays a fixed script of outcomes and counts invocations.
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<FetchSuccess, FetchError>>>,
    calls: AtomicU32,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<FetchSuccess, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchSuccess, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::status(url, 403)))
    }
}

/// Layer that records the severities of info-and-above events, in order.
#[derive(Clone, Default)]
struct LevelRecorder {
    levels: Arc<std::sync::Mutex<Vec<Level>>>,
}

impl LevelRecorder {
    fn levels(&self) -> Vec<Level> {
        self.levels.lock().expect("recorder lock poisoned").clone()
    }
}

impl<S: tracing::Subscriber> Layer<S> for LevelRecorder {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level == Level::INFO || level == Level::WARN {
            self.levels
                .lock()
                .expect("recorder lock poisoned")
                .push(level);
        }
    }
}

fn success(body: &[u8]) -> Result<FetchSuccess, FetchError> {
    Ok(FetchSuccess {
        body: body.to_vec(),
        last_modified: None,
    })
}

fn request_to(temp_dir: &TempDir, unit: Duration, max_attempts: u32) -> RetrievalRequest {
    RetrievalRequest::new("https://example.com/data.tsv")
        .with_destination(temp_dir.path().join("data.tsv"))
        .with_backoff_unit(unit)
        .with_max_attempts(max_attempts)
}

#[tokio::test(start_paused = true)]
async fn test_two_failures_then_success_uses_exactly_three_attempts() {
    let transport = ScriptedTransport::new(vec![
        Err(FetchError::status("https://example.com/data.tsv", 404)),
        Err(FetchError::status("https://example.com/data.tsv", 404)),
        success(b"finally"),
    ]);
    let retriever = FileRetriever::with_transport(transport.clone());
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let retrieved = retriever
        .retrieve(request_to(&temp_dir, Duration::from_secs(5), 3))
        .await
        .expect("third attempt should succeed");

    assert_eq!(transport.calls(), 3);
    assert_eq!(retrieved.len, "finally".len() as u64);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_sleeps_are_linear_multiples_of_the_unit() {
    let transport = ScriptedTransport::new(vec![
        Err(FetchError::status("https://example.com/data.tsv", 404)),
        Err(FetchError::status("https://example.com/data.tsv", 404)),
        success(b"finally"),
    ]);
    let retriever = FileRetriever::with_transport(transport.clone());
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let started = tokio::time::Instant::now();
    retriever
        .retrieve(request_to(&temp_dir, Duration::from_secs(5), 3))
        .await
        .expect("third attempt should succeed");
    let elapsed = started.elapsed();

    // Under the paused clock, virtual time advances only through the backoff
    // sleeps: 1 x 5s after attempt 1, then 2 x 5s after attempt 2.
    assert!(
        elapsed >= Duration::from_secs(15),
        "expected at least 15s of backoff, got {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(16),
        "expected no extra backoff beyond 15s, got {elapsed:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_first_failure_logs_info_and_later_failures_warn() {
    let recorder = LevelRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let transport = ScriptedTransport::new(vec![
        Err(FetchError::status("https://example.com/data.tsv", 404)),
        Err(FetchError::status("https://example.com/data.tsv", 404)),
        success(b"finally"),
    ]);
    let retriever = FileRetriever::with_transport(transport.clone());
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    retriever
        .retrieve(request_to(&temp_dir, Duration::from_secs(1), 3))
        .await
        .expect("third attempt should succeed");

    // The first failure stays at info; repeats escalate to warn so a flaky
    // endpoint does not flood the logs.
    assert_eq!(
        recorder.levels(),
        vec![Level::INFO, Level::WARN],
        "expected one info then one warn fetch-failure event"
    );
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_invokes_transport_exactly_max_attempts_times() {
    let transport = ScriptedTransport::new(vec![]);
    let retriever = FileRetriever::with_transport(transport.clone());
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let result = retriever
        .retrieve(request_to(&temp_dir, Duration::from_secs(1), 5))
        .await;

    assert_eq!(transport.calls(), 5);
    match result {
        Err(RetrieveError::Exhausted { attempts, source, .. }) => {
            assert_eq!(attempts, 5);
            assert!(matches!(source, FetchError::Status { status: 403, .. }));
        }
        other => panic!("Expected Exhausted, got: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_request_never_sleeps() {
    let transport = ScriptedTransport::new(vec![]);
    let retriever = FileRetriever::with_transport(transport.clone());
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let started = tokio::time::Instant::now();
    let result = retriever
        .retrieve(request_to(&temp_dir, Duration::from_secs(60), 1))
        .await;

    assert_eq!(transport.calls(), 1);
    assert!(result.is_err());
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_empty_body_failures_are_retried() {
    let transport = ScriptedTransport::new(vec![
        Err(FetchError::empty_body("https://example.com/data.tsv")),
        success(b"content"),
    ]);
    let retriever = FileRetriever::with_transport(transport.clone());
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    retriever
        .retrieve(request_to(&temp_dir, Duration::from_secs(1), 3))
        .await
        .expect("second attempt should succeed");

    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_normalization_failure_is_not_retried() {
    // A valid zip whose only entry is a directory: the archive opens but
    // yields nothing extractable.
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .add_directory("sub/", zip::write::SimpleFileOptions::default())
        .expect("should add directory entry");
    let archive = writer.finish().expect("should finish archive").into_inner();

    let transport = ScriptedTransport::new(vec![success(&archive)]);
    let retriever = FileRetriever::with_transport(transport.clone());
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let request = RetrievalRequest::new("https://example.com/empty.zip")
        .with_destination(temp_dir.path().join("empty.tsv"))
        .with_max_attempts(3);
    let result = retriever.retrieve(request).await;

    // One fetch only: extraction failures are structural, not transient.
    assert_eq!(transport.calls(), 1);
    assert!(
        matches!(result, Err(RetrieveError::Normalize(_))),
        "Expected Normalize error, got: {result:?}"
    );
}
