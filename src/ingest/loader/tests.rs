use super::*;
use crate::chat::ChatMessage;
use crate::ingest::batch::chunk;
use crate::ingest::normalize::{DatetimeSource, NormalizedMessage};
use crate::ingest::sink::RestSink;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn batches(n: usize, size: usize) -> Vec<Batch> {
    let records = (0..n)
        .map(|i| NormalizedMessage {
            message: ChatMessage {
                text: Some(format!("message {}", i)),
                ..ChatMessage::default()
            },
            datetime: Utc::now(),
            source: DatetimeSource::Parsed,
            content_key: i.to_string(),
        })
        .collect();
    chunk(records, size)
}

/// Fails the listed batch indices with the given status a fixed number of times.
#[derive(Default)]
struct ScriptedSink {
    failures: Mutex<HashMap<usize, (Option<u16>, usize)>>,
    delays_ms: HashMap<usize, u64>,
    calls: Mutex<Vec<usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSink {
    fn failing(index: usize, status: Option<u16>, times: usize) -> Self {
        let sink = Self::default();
        sink.failures.lock().unwrap().insert(index, (status, times));
        sink
    }

    fn slow(mut self, index: usize, delay_ms: u64) -> Self {
        self.delays_ms.insert(index, delay_ms);
        self
    }
}

#[async_trait]
impl BulkSink for ScriptedSink {
    async fn insert(&self, batch: &Batch) -> Result<(), KeepsakeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self.delays_ms.get(&batch.index).copied().unwrap_or(5);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.calls.lock().unwrap().push(batch.index);
        let mut failures = self.failures.lock().unwrap();
        if let Some((status, remaining)) = failures.get_mut(&batch.index)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(KeepsakeError::Batch {
                index: batch.index,
                status: *status,
                reason: "scripted".into(),
                body: String::new(),
            });
        }
        Ok(())
    }
}

fn fast_retry(max_retries: usize) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        backoff_multiplier: 2.0,
    }
}

#[tokio::test]
async fn test_run_all_succeed() {
    let sink = Arc::new(ScriptedSink::default());
    let loader = BatchLoader::new(sink.clone());
    let report = loader.run(&batches(1201, 500)).await;
    assert_eq!(report.total, 1201);
    assert_eq!(report.submitted, 1201);
    assert_eq!(report.batches, 3);
    assert!(report.is_complete());
    assert_eq!(*sink.calls.lock().unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_failed_batch_does_not_abort_run() {
    let sink = Arc::new(ScriptedSink::failing(1, Some(400), usize::MAX));
    let loader = BatchLoader::new(sink.clone());
    let report = loader.run(&batches(700, 500)).await;

    assert_eq!(*sink.calls.lock().unwrap(), vec![1, 2]);
    assert_eq!(report.submitted, 200);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.failed[0].size, 500);
    assert_eq!(report.failed[0].status, Some(400));
    assert!(!report.is_complete());
}

#[tokio::test]
async fn test_no_retry_by_default() {
    let sink = Arc::new(ScriptedSink::failing(1, Some(503), 1));
    let report = BatchLoader::new(sink.clone()).run(&batches(10, 500)).await;
    assert_eq!(sink.calls.lock().unwrap().len(), 1);
    assert_eq!(report.failed.len(), 1);
}

#[tokio::test]
async fn test_retryable_failure_is_retried() {
    let sink = Arc::new(ScriptedSink::failing(1, Some(503), 2));
    let report = BatchLoader::new(sink.clone())
        .with_retry(fast_retry(3))
        .run(&batches(10, 500))
        .await;
    assert_eq!(sink.calls.lock().unwrap().len(), 3);
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_transport_failure_is_retried() {
    let sink = Arc::new(ScriptedSink::failing(1, None, 1));
    let report = BatchLoader::new(sink.clone())
        .with_retry(fast_retry(1))
        .run(&batches(10, 500))
        .await;
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let sink = Arc::new(ScriptedSink::failing(1, Some(409), 1));
    let report = BatchLoader::new(sink.clone())
        .with_retry(fast_retry(3))
        .run(&batches(10, 500))
        .await;
    assert_eq!(sink.calls.lock().unwrap().len(), 1);
    assert_eq!(report.failed[0].status, Some(409));
}

#[tokio::test]
async fn test_retries_exhausted() {
    let sink = Arc::new(ScriptedSink::failing(2, Some(500), usize::MAX));
    let report = BatchLoader::new(sink.clone())
        .with_retry(fast_retry(2))
        .run(&batches(20, 10))
        .await;
    assert_eq!(sink.calls.lock().unwrap().len(), 1 + 3);
    assert_eq!(report.submitted, 10);
    assert_eq!(report.failed[0].index, 2);
}

#[tokio::test]
async fn test_sequential_by_default() {
    let sink = Arc::new(ScriptedSink::default());
    BatchLoader::new(sink.clone()).run(&batches(50, 5)).await;
    assert_eq!(sink.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_results_follow_batch_order() {
    let sink = ScriptedSink::default().slow(1, 60);
    for index in [1, 3, 5] {
        sink.failures.lock().unwrap().insert(index, (Some(400), 1));
    }
    let sink = Arc::new(sink);
    let report = BatchLoader::new(sink.clone())
        .with_concurrency(3)
        .run(&batches(30, 5))
        .await;

    // batch 1 finishes after the two batches started with it
    let calls = sink.calls.lock().unwrap().clone();
    assert_ne!(calls[0], 1);
    let failed: Vec<usize> = report.failed.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![1, 3, 5]);
    assert_eq!(report.submitted, 15);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let sink = Arc::new(ScriptedSink::default());
    let report = BatchLoader::new(sink.clone())
        .with_concurrency(3)
        .run(&batches(50, 5))
        .await;
    let max = sink.max_in_flight.load(Ordering::SeqCst);
    assert!(max >= 1 && max <= 3, "max in flight was {max}");
    assert_eq!(report.submitted, 50);
}

#[tokio::test]
async fn test_empty_run() {
    let sink = Arc::new(ScriptedSink::default());
    let report = BatchLoader::new(sink).run(&[]).await;
    assert_eq!(report, LoadReport::default());
    assert!(report.is_complete());
}

#[test]
fn test_delay_is_capped_with_jitter() {
    let retry = RetryConfig {
        max_retries: 5,
        initial_delay_ms: 1000,
        max_delay_ms: 4000,
        backoff_multiplier: 2.0,
    };
    let first = retry.delay_ms(0);
    assert!((1000..=1250).contains(&first));
    let capped = retry.delay_ms(10);
    assert!((4000..=5000).contains(&capped));
}

#[test]
fn test_retry_config_from_store() {
    let store = StoreConfig {
        max_retries: 4,
        retry_base_delay_ms: 250,
        ..StoreConfig::default()
    };
    let retry = RetryConfig::from_store(&store);
    assert_eq!(retry.max_retries, 4);
    assert_eq!(retry.initial_delay_ms, 250);
}

#[tokio::test]
async fn test_run_against_rest_sink() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let store = StoreConfig {
        url: server.uri(),
        api_key: "anon-key".into(),
        batch_size: 3,
        ..StoreConfig::default()
    };
    let sink = Arc::new(RestSink::new(&store));
    let report = BatchLoader::new(sink).run(&batches(5, 3)).await;
    assert_eq!(report.submitted, 5);
    assert!(report.is_complete());
}
