//! Chat export → remote store migration.

pub mod batch;
pub mod loader;
pub mod normalize;
pub mod sink;
pub mod timestamp;

pub use batch::{Batch, chunk};
pub use loader::{BatchFailure, BatchLoader, LoadReport, RetryConfig};
pub use normalize::{DatetimeSource, NormalizedMessage, Prepared, ProvenanceCounts, prepare};
pub use sink::{BulkSink, RestSink};
pub use timestamp::{Normalizer, TimestampParseError};

use crate::chat::load_corpus;
use crate::config::Config;
use crate::errors::KeepsakeError;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// What a migration run did.
#[derive(Debug, Clone, Default)]
pub struct MigrationOutcome {
    pub counts: ProvenanceCounts,
    pub batches: usize,
    /// `None` for a dry run.
    pub report: Option<LoadReport>,
}

/// Load the export at `input`, resolve timestamps, batch and submit.
///
/// Passing no sink performs a dry run: everything up to batching happens, but
/// nothing is sent. Failed batches are reported, never returned as errors.
pub async fn run_migration(
    input: &Path,
    config: &Config,
    sink: Option<Arc<dyn BulkSink>>,
    now: DateTime<Utc>,
) -> Result<MigrationOutcome, KeepsakeError> {
    let normalizer = Normalizer::from_config(&config.timestamps)?;
    let messages = load_corpus(input)?;
    info!("loaded {} messages from {}", messages.len(), input.display());

    let prepared = prepare(messages, &normalizer, now);
    if prepared.counts.defaulted > 0 {
        warn!(
            "{} messages had no usable date/time and were stamped with the run start time: {:?}",
            prepared.counts.defaulted, prepared.counts.defaulted_by_reason
        );
    }

    let batches = chunk(prepared.records, config.store.batch_size);
    let mut outcome = MigrationOutcome {
        counts: prepared.counts,
        batches: batches.len(),
        report: None,
    };

    let Some(sink) = sink else {
        info!(
            "dry run: {} messages in {} batches, nothing sent",
            batches.iter().map(Batch::len).sum::<usize>(),
            batches.len()
        );
        return Ok(outcome);
    };

    let loader = BatchLoader::new(sink)
        .with_retry(RetryConfig::from_store(&config.store))
        .with_concurrency(config.store.concurrency);
    let report = loader.run(&batches).await;
    if report.is_complete() {
        info!(
            "migration complete: {} messages in {} batches",
            report.submitted, report.batches
        );
    } else {
        warn!(
            "migration finished with {} failed batches ({} of {} messages inserted)",
            report.failed.len(),
            report.submitted,
            report.total
        );
    }
    outcome.report = Some(report);
    Ok(outcome)
}
