use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Generates a `Debug` impl that redacts secret fields.
///
/// Field specifiers:
/// - `field_name`            : printed normally via `&self.field_name`
/// - `redact(field_name)`    : `String` field, shows `[empty]` or `[REDACTED]`
macro_rules! redact_debug {
    // Internal: emit a single .field() call
    (@field $builder:ident, $self:ident, redact($field:ident)) => {
        $builder.field(
            stringify!($field),
            &if $self.$field.is_empty() {
                "[empty]"
            } else {
                "[REDACTED]"
            },
        );
    };
    (@field $builder:ident, $self:ident, $field:ident) => {
        $builder.field(stringify!($field), &$self.$field);
    };

    // Internal: recursive TT muncher
    (@fields $builder:ident, $self:ident,) => {};
    (@fields $builder:ident, $self:ident, redact($field:ident), $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, redact($field));
        redact_debug!(@fields $builder, $self, $($rest)*);
    };
    (@fields $builder:ident, $self:ident, $field:ident, $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, $field);
        redact_debug!(@fields $builder, $self, $($rest)*);
    };

    // Entry point
    ($struct_name:ident, $($fields:tt)*) => {
        impl std::fmt::Debug for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut builder = f.debug_struct(stringify!($struct_name));
                redact_debug!(@fields builder, self, $($fields)*);
                builder.finish()
            }
        }
    };
}

// Declared after the macro so they can use `redact_debug!`
mod analysis;
mod ingest;

pub use analysis::*;
pub use ingest::*;

use crate::errors::KeepsakeError;
use crate::utils::expand_path;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub timestamps: TimestampConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

impl Config {
    pub fn chat_path(&self) -> PathBuf {
        expand_path(&self.source.chat_path)
    }

    pub fn digest_path(&self) -> PathBuf {
        expand_path(&self.analysis.output_path)
    }

    pub fn stats_input_path(&self) -> PathBuf {
        self.stats
            .input_path
            .as_deref()
            .map_or_else(|| self.chat_path(), expand_path)
    }

    pub fn stats_output_path(&self) -> PathBuf {
        expand_path(&self.stats.output_path)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), KeepsakeError> {
        self.validate_timestamps()?;
        self.validate_store()?;
        self.validate_analysis()?;
        self.validate_stats()?;
        Ok(())
    }

    /// Checks that only matter when actually talking to the store.
    pub fn require_store(&self) -> Result<(), KeepsakeError> {
        if self.store.url.is_empty() {
            return Err(KeepsakeError::Config(
                "store.url is required for migration (or set KEEPSAKE_STORE_URL)".into(),
            ));
        }
        if self.store.api_key.is_empty() {
            return Err(KeepsakeError::Config(
                "store.apiKey is required for migration (or set KEEPSAKE_STORE_API_KEY)".into(),
            ));
        }
        Ok(())
    }

    fn validate_timestamps(&self) -> Result<(), KeepsakeError> {
        let t = &self.timestamps;

        if t.century == 0 || t.century > 99 {
            return Err(KeepsakeError::Config(
                "timestamps.century must be between 1 and 99".into(),
            ));
        }
        if let Some(pivot) = t.pivot
            && pivot > 99
        {
            return Err(KeepsakeError::Config(
                "timestamps.pivot must be between 0 and 99".into(),
            ));
        }
        if t.min_year > t.max_year {
            return Err(KeepsakeError::Config(
                "timestamps.minYear must be <= timestamps.maxYear".into(),
            ));
        }
        if let Some(ref tz) = t.timezone
            && tz.parse::<chrono_tz::Tz>().is_err()
        {
            return Err(KeepsakeError::Config(format!(
                "timestamps.timezone '{}' is not a known IANA zone",
                tz
            )));
        }
        Ok(())
    }

    fn validate_store(&self) -> Result<(), KeepsakeError> {
        let s = &self.store;

        if s.batch_size == 0 {
            return Err(KeepsakeError::Config("store.batchSize must be > 0".into()));
        }
        if s.batch_size > 10_000 {
            return Err(KeepsakeError::Config(
                "store.batchSize is unreasonably large (> 10,000)".into(),
            ));
        }
        if s.concurrency == 0 || s.concurrency > 16 {
            return Err(KeepsakeError::Config(
                "store.concurrency must be between 1 and 16".into(),
            ));
        }
        if s.max_retries > 10 {
            return Err(KeepsakeError::Config(
                "store.maxRetries is unreasonably large (> 10)".into(),
            ));
        }
        if s.timeout_secs == 0 {
            return Err(KeepsakeError::Config("store.timeoutSecs must be > 0".into()));
        }
        if s.timeout_secs > 600 {
            warn!("store.timeoutSecs is very long (> 600s), a stuck batch will stall the run");
        }
        if s.table.is_empty() {
            return Err(KeepsakeError::Config("store.table must not be empty".into()));
        }
        if !s.url.is_empty() {
            let parsed = url::Url::parse(&s.url)
                .map_err(|e| KeepsakeError::Config(format!("store.url is invalid: {}", e)))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(KeepsakeError::Config(
                    "store.url must use http or https".into(),
                ));
            }
            if parsed.scheme() == "http" {
                warn!("store.url uses plain http, the API key will be sent unencrypted");
            }
        }
        Ok(())
    }

    fn validate_analysis(&self) -> Result<(), KeepsakeError> {
        let a = &self.analysis;

        if a.participants.len() != 2 {
            return Err(KeepsakeError::Config(format!(
                "analysis.participants must list exactly 2 participants (got {})",
                a.participants.len()
            )));
        }
        if a.participants.iter().any(|p| p.name.trim().is_empty()) {
            return Err(KeepsakeError::Config(
                "analysis.participants[].name must not be empty".into(),
            ));
        }
        if a.participants[0].name == a.participants[1].name {
            return Err(KeepsakeError::Config(
                "analysis.participants must have distinct names".into(),
            ));
        }
        if a.participants[0].identifiers.iter().all(String::is_empty) {
            warn!(
                "analysis.participants[0] has no identifiers, every sender will be attributed to {}",
                a.participants[1].name
            );
        }
        if a.max_entries == 0 {
            return Err(KeepsakeError::Config("analysis.maxEntries must be > 0".into()));
        }
        if a.max_short_length == 0 {
            return Err(KeepsakeError::Config(
                "analysis.maxShortLength must be > 0".into(),
            ));
        }
        let keyword_lists = [
            ("likes", &a.likes),
            ("dislikes", &a.dislikes),
            ("milestones", &a.milestones),
            ("emojis.romantic", &a.emojis.romantic),
            ("emojis.playful", &a.emojis.playful),
            ("emojis.sad", &a.emojis.sad),
        ];
        for (name, list) in keyword_lists {
            if list.iter().any(String::is_empty) {
                return Err(KeepsakeError::Config(format!(
                    "analysis.{} must not contain empty entries",
                    name
                )));
            }
        }
        Ok(())
    }

    fn validate_stats(&self) -> Result<(), KeepsakeError> {
        if self.stats.top_words == 0 {
            return Err(KeepsakeError::Config("stats.topWords must be > 0".into()));
        }
        if self.stats.top_words > 10_000 {
            warn!("stats.topWords is very large (> 10,000), the output file will be big");
        }
        Ok(())
    }
}
