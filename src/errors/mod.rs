use std::path::PathBuf;
use thiserror::Error;

/// Typed error hierarchy for keepsake.
///
/// Use at module boundaries (source loading, batch submission, config validation,
/// output writes). Internal/leaf functions can continue using `anyhow::Result`, the
/// `Internal` variant allows seamless conversion via the `?` operator.
#[derive(Debug, Error)]
pub enum KeepsakeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Failed to parse source file {}: {message}", .path.display())]
    SourceParse { path: PathBuf, message: String },

    /// One bulk-insert request failed. `status` is `None` for transport-level failures.
    #[error("Batch {index} failed: {}", describe_batch_failure(.status, .reason, .body))]
    Batch {
        index: usize,
        status: Option<u16>,
        reason: String,
        body: String,
    },

    #[error("Failed to write {}: {message}", .path.display())]
    Output { path: PathBuf, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn describe_batch_failure(status: &Option<u16>, reason: &str, body: &str) -> String {
    match *status {
        Some(code) if body.is_empty() => format!("{} {}", code, reason),
        Some(code) => format!("{} {}: {}", code, reason, body),
        None => format!("network error: {}", reason),
    }
}

/// Convenience alias for results using `KeepsakeError`.
pub type KeepsakeResult<T> = std::result::Result<T, KeepsakeError>;

impl KeepsakeError {
    /// Whether this error is transient and the operation should be retried.
    ///
    /// Only batch submissions are ever retried: transport errors, request
    /// timeouts, rate limits and server errors qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Batch { status: None, .. } => true,
            Self::Batch {
                status: Some(code), ..
            } => *code == 408 || *code == 429 || *code >= 500,
            Self::Config(_)
            | Self::SourceMissing(_)
            | Self::SourceParse { .. }
            | Self::Output { .. }
            | Self::Internal(_) => false,
        }
    }
}
