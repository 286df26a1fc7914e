//! Turn raw chat records into store rows with a guaranteed timestamp.

use super::timestamp::Normalizer;
use crate::chat::ChatMessage;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Where a record's `datetime` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatetimeSource {
    /// The export already carried an RFC 3339 timestamp.
    Existing,
    /// Resolved from `date` + `time`.
    Parsed,
    /// Parsing failed and the run's start time was substituted.
    Defaulted,
}

impl DatetimeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Existing => "existing",
            Self::Parsed => "parsed",
            Self::Defaulted => "defaulted",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedMessage {
    pub message: ChatMessage,
    pub datetime: DateTime<Utc>,
    pub source: DatetimeSource,
    pub content_key: String,
}

/// Which optional columns go into each row.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowOptions {
    pub content_key: bool,
    pub provenance: bool,
}

impl NormalizedMessage {
    /// The JSON object sent to the store.
    ///
    /// Every row carries the same core keys (absent fields become `null`),
    /// which bulk-insert endpoints require across one request.
    pub fn to_row(&self, options: RowOptions) -> Value {
        let mut row: Map<String, Value> = self.message.extra.clone();
        let text = |field: &Option<String>| field.clone().map_or(Value::Null, Value::String);
        row.insert("sender".into(), text(&self.message.sender));
        row.insert("date".into(), text(&self.message.date));
        row.insert("time".into(), text(&self.message.time));
        row.insert("text".into(), text(&self.message.text));
        row.insert("datetime".into(), Value::String(format_datetime(&self.datetime)));
        if options.content_key {
            row.insert("content_key".into(), Value::String(self.content_key.clone()));
        }
        if options.provenance {
            row.insert(
                "datetime_source".into(),
                Value::String(self.source.as_str().into()),
            );
        }
        Value::Object(row)
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stable identity of a raw record, independent of when it was migrated.
pub fn content_key(message: &ChatMessage) -> String {
    let mut hasher = Sha256::new();
    let fields = [
        message.sender(),
        message.date(),
        message.time(),
        message.datetime.as_deref().unwrap_or_default(),
        message.text(),
    ];
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            hasher.update("\u{1f}".as_bytes());
        }
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// How many records took each path, and why fallbacks happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvenanceCounts {
    pub existing: usize,
    pub parsed: usize,
    pub defaulted: usize,
    pub defaulted_by_reason: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Prepared {
    pub records: Vec<NormalizedMessage>,
    pub counts: ProvenanceCounts,
}

/// Resolve a timestamp for every record, in input order.
///
/// Nothing is dropped: a record whose date/time cannot be parsed gets `now`.
pub fn prepare(messages: Vec<ChatMessage>, normalizer: &Normalizer, now: DateTime<Utc>) -> Prepared {
    let mut counts = ProvenanceCounts::default();
    let mut records = Vec::with_capacity(messages.len());

    for (position, message) in messages.into_iter().enumerate() {
        let key = content_key(&message);
        let existing = message
            .datetime
            .as_deref()
            .and_then(|s| normalizer.parse_existing(s));

        let (datetime, source) = if let Some(dt) = existing {
            counts.existing += 1;
            (dt, DatetimeSource::Existing)
        } else {
            match normalizer.normalize(message.date(), message.time()) {
                Ok(dt) => {
                    counts.parsed += 1;
                    (dt, DatetimeSource::Parsed)
                }
                Err(e) => {
                    warn!(
                        "message {} ({:?} {:?}): {}, using run start time",
                        position,
                        message.date(),
                        message.time(),
                        e
                    );
                    counts.defaulted += 1;
                    *counts.defaulted_by_reason.entry(e.reason()).or_default() += 1;
                    (now, DatetimeSource::Defaulted)
                }
            }
        };

        records.push(NormalizedMessage {
            message,
            datetime,
            source,
            content_key: key,
        });
    }

    debug!(
        "prepared {} records: {} existing, {} parsed, {} defaulted",
        records.len(),
        counts.existing,
        counts.parsed,
        counts.defaulted
    );
    Prepared { records, counts }
}
