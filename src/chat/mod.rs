//! The exported chat history shared by every subcommand.

use crate::errors::KeepsakeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One message from the exported chat file.
///
/// Every field may be missing or `null` in the export. Unknown fields are
/// kept in `extra` and forwarded to the store untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub sender: Option<String>,
    /// `DD/MM/YY`
    #[serde(default)]
    pub date: Option<String>,
    /// `H:MM am|pm`, sometimes padded with invisible non-ASCII characters.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Pre-resolved timestamp from an earlier export, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatMessage {
    pub fn sender(&self) -> &str {
        self.sender.as_deref().unwrap_or_default()
    }

    pub fn date(&self) -> &str {
        self.date.as_deref().unwrap_or_default()
    }

    pub fn time(&self) -> &str {
        self.time.as_deref().unwrap_or_default()
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Read and parse the chat export at `path`.
///
/// A missing file and a malformed file are reported separately so callers can
/// log which one happened; neither writes anything.
pub fn load_corpus(path: &Path) -> Result<Vec<ChatMessage>, KeepsakeError> {
    if !path.exists() {
        return Err(KeepsakeError::SourceMissing(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| KeepsakeError::SourceParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_corpus(&content).map_err(|e| KeepsakeError::SourceParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse a JSON array of chat messages.
pub fn parse_corpus(content: &str) -> serde_json::Result<Vec<ChatMessage>> {
    serde_json::from_str(content)
}
