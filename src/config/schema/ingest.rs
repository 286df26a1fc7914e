use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

fn default_chat_path() -> String {
    "public/chat.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Exported chat history (JSON array of messages).
    #[serde(default = "default_chat_path", rename = "chatPath")]
    pub chat_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            chat_path: default_chat_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

fn default_century() -> u8 {
    20
}

fn default_min_year() -> i32 {
    2000
}

fn default_max_year() -> i32 {
    2099
}

/// How two-digit years and local wall-clock times are resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampConfig {
    /// Century prefix for two-digit years (20 → `25` becomes 2025).
    #[serde(default = "default_century")]
    pub century: u8,
    /// Two-digit years above the pivot resolve to the previous century.
    #[serde(default)]
    pub pivot: Option<u8>,
    #[serde(default = "default_min_year", rename = "minYear")]
    pub min_year: i32,
    #[serde(default = "default_max_year", rename = "maxYear")]
    pub max_year: i32,
    /// IANA zone name (e.g. `Africa/Cairo`). Unset means the system local zone.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            century: default_century(),
            pivot: None,
            min_year: default_min_year(),
            max_year: default_max_year(),
            timezone: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Remote store
// ---------------------------------------------------------------------------

fn default_table() -> String {
    "messages".to_string()
}

fn default_batch_size() -> usize {
    500
}

fn default_concurrency() -> usize {
    1
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

/// PostgREST-compatible bulk-insert endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// REST base URL, e.g. `https://<project>.supabase.co/rest/v1`.
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "apiKey")]
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_batch_size", rename = "batchSize")]
    pub batch_size: usize,
    /// Batches in flight at once. 1 submits strictly one after another.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default, rename = "maxRetries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_base_delay_ms", rename = "retryBaseDelayMs")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_timeout_secs", rename = "timeoutSecs")]
    pub timeout_secs: u64,
    /// Send `content_key` and ignore rows that already exist.
    ///
    /// The table needs a unique `content_key` column, otherwise every batch is rejected.
    #[serde(default)]
    pub idempotent: bool,
    /// Also send the `datetime_source` provenance column.
    #[serde(default, rename = "includeProvenance")]
    pub include_provenance: bool,
}

redact_debug!(
    StoreConfig,
    url,
    redact(api_key),
    table,
    batch_size,
    concurrency,
    max_retries,
    retry_base_delay_ms,
    timeout_secs,
    idempotent,
    include_provenance,
);

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            table: default_table(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            max_retries: 0,
            retry_base_delay_ms: default_retry_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
            idempotent: false,
            include_provenance: false,
        }
    }
}
