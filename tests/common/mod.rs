// Shared test helpers, not all items used by every test binary.
#![allow(unused)]

use async_trait::async_trait;
use keepsake::chat::ChatMessage;
use keepsake::config::Config;
use keepsake::errors::KeepsakeError;
use keepsake::ingest::{Batch, BulkSink};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Sink that records every row it accepts and rejects chosen batch indices.
#[derive(Default)]
pub struct MockSink {
    pub reject: HashSet<usize>,
    pub status: u16,
    pub attempts: Mutex<Vec<usize>>,
    pub accepted: Mutex<Vec<String>>,
}

impl MockSink {
    pub fn rejecting(indices: &[usize], status: u16) -> Self {
        Self {
            reject: indices.iter().copied().collect(),
            status,
            ..Self::default()
        }
    }

    pub fn accepted_texts(&self) -> Vec<String> {
        self.accepted.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> Vec<usize> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl BulkSink for MockSink {
    async fn insert(&self, batch: &Batch) -> Result<(), KeepsakeError> {
        self.attempts.lock().unwrap().push(batch.index);
        if self.reject.contains(&batch.index) {
            return Err(KeepsakeError::Batch {
                index: batch.index,
                status: Some(self.status),
                reason: "Bad Request".into(),
                body: r#"{"message":"rejected by mock"}"#.into(),
            });
        }
        self.accepted.lock().unwrap().extend(
            batch
                .records
                .iter()
                .map(|r| r.message.text().to_string()),
        );
        Ok(())
    }
}

pub fn message(sender: &str, date: &str, time: &str, text: &str) -> ChatMessage {
    ChatMessage {
        sender: Some(sender.to_string()),
        date: Some(date.to_string()),
        time: Some(time.to_string()),
        text: Some(text.to_string()),
        ..ChatMessage::default()
    }
}

pub fn write_corpus(dir: &Path, messages: &[ChatMessage]) -> PathBuf {
    let path = dir.join("chat.json");
    std::fs::write(&path, serde_json::to_string(messages).unwrap()).unwrap();
    path
}

/// Config with every path inside `dir` and wall-clock times read as UTC.
pub fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.source.chat_path = dir.join("chat.json").display().to_string();
    config.analysis.output_path = dir.join("relationship_memory.json").display().to_string();
    config.stats.output_path = dir.join("analytics_results.json").display().to_string();
    config.timestamps.timezone = Some("UTC".to_string());
    config
}
