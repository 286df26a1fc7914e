use super::batch::Batch;
use super::normalize::RowOptions;
use crate::config::StoreConfig;
use crate::errors::KeepsakeError;
use crate::utils::http::{MAX_ERROR_BODY_BYTES, http_client, limited_text};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Destination that accepts one batch of rows per call.
#[async_trait]
pub trait BulkSink: Send + Sync {
    async fn insert(&self, batch: &Batch) -> Result<(), KeepsakeError>;
}

/// PostgREST-style bulk insert: `POST {url}/{table}` with a JSON array body.
pub struct RestSink {
    client: Client,
    endpoint: String,
    api_key: String,
    row_options: RowOptions,
    idempotent: bool,
}

impl RestSink {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: http_client(Duration::from_secs(config.timeout_secs)),
            endpoint: format!("{}/{}", config.url.trim_end_matches('/'), config.table),
            api_key: config.api_key.clone(),
            row_options: RowOptions {
                content_key: config.idempotent,
                provenance: config.include_provenance,
            },
            idempotent: config.idempotent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn prefer_header(&self) -> &'static str {
        if self.idempotent {
            "return=minimal,resolution=ignore-duplicates"
        } else {
            "return=minimal"
        }
    }
}

#[async_trait]
impl BulkSink for RestSink {
    async fn insert(&self, batch: &Batch) -> Result<(), KeepsakeError> {
        let rows: Vec<Value> = batch
            .records
            .iter()
            .map(|r| r.to_row(self.row_options))
            .collect();

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Prefer", self.prefer_header());
        if self.idempotent {
            request = request.query(&[("on_conflict", "content_key")]);
        }

        debug!("batch {}: posting {} rows", batch.index, rows.len());
        let resp = request
            .json(&rows)
            .send()
            .await
            .map_err(|e| KeepsakeError::Batch {
                index: batch.index,
                status: None,
                reason: e.to_string(),
                body: String::new(),
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = limited_text(resp, MAX_ERROR_BODY_BYTES)
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        Err(KeepsakeError::Batch {
            index: batch.index,
            status: Some(status.as_u16()),
            reason,
            body,
        })
    }
}

#[cfg(test)]
mod tests;
