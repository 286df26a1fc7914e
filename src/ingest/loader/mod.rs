use super::batch::Batch;
use super::sink::BulkSink;
use crate::config::StoreConfig;
use crate::errors::KeepsakeError;
use futures_util::StreamExt;
use futures_util::stream;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for retry behavior with exponential backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn from_store(config: &StoreConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay_ms: config.retry_base_delay_ms,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based), plus up to 25% jitter.
    fn delay_ms(&self, attempt: usize) -> u64 {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = (self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent))
            .min(self.max_delay_ms as f64) as u64;
        let jitter = (base as f64 * 0.25 * fastrand::f64()) as u64;
        base + jitter
    }
}

/// A batch the store did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub index: usize,
    pub size: usize,
    pub status: Option<u16>,
    pub message: String,
}

/// Outcome of one migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total: usize,
    /// Records in batches the store acknowledged. There is no per-row
    /// acknowledgement, so this counts whole batches.
    pub submitted: usize,
    pub batches: usize,
    pub failed: Vec<BatchFailure>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.submitted == self.total
    }
}

pub struct BatchLoader {
    sink: Arc<dyn BulkSink>,
    retry: RetryConfig,
    concurrency: usize,
}

impl BatchLoader {
    pub fn new(sink: Arc<dyn BulkSink>) -> Self {
        Self {
            sink,
            retry: RetryConfig::default(),
            concurrency: 1,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Batches allowed in flight at once. Results are still handled in batch order.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Submit every batch. A failed batch is logged and skipped; the run
    /// always continues to the end.
    pub async fn run(&self, batches: &[Batch]) -> LoadReport {
        let total: usize = batches.iter().map(Batch::len).sum();
        let mut report = LoadReport {
            total,
            batches: batches.len(),
            ..LoadReport::default()
        };

        let mut results = stream::iter(batches)
            .map(|batch| async move { (batch, self.submit(batch).await) })
            .buffered(self.concurrency);

        while let Some((batch, result)) = results.next().await {
            match result {
                Ok(()) => {
                    report.submitted += batch.len();
                    info!("inserted {} / {} messages", report.submitted, total);
                }
                Err(e) => {
                    warn!("{}", e);
                    let status = match &e {
                        KeepsakeError::Batch { status, .. } => *status,
                        _ => None,
                    };
                    report.failed.push(BatchFailure {
                        index: batch.index,
                        size: batch.len(),
                        status,
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }

    async fn submit(&self, batch: &Batch) -> Result<(), KeepsakeError> {
        let mut attempt = 0;
        loop {
            match self.sink.insert(batch).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_ms(attempt);
                    debug!(
                        "batch {} attempt {} failed ({}), retrying in {}ms",
                        batch.index,
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests;
