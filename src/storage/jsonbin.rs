//! JSONBin.io (v3) backend: one bin holds the whole document.

use crate::config::JsonBinConfig;
use crate::storage::{StorageError, TaskStore};
use crate::tasks::TaskDocument;
use async_trait::async_trait;
use std::time::Duration;

const MASTER_KEY_HEADER: &str = "X-Master-Key";

/// Reads with `GET /b/{id}/latest`, writes with `PUT /b/{id}`.
pub struct JsonBinStore {
    client: reqwest::Client,
    base_url: String,
    bin_id: String,
    master_key: String,
}

impl JsonBinStore {
    pub fn new(config: &JsonBinConfig, timeout: Duration) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            bin_id: config.bin_id.clone(),
            master_key: config.master_key.clone(),
        })
    }

    fn bin_url(&self) -> String {
        format!("{}/b/{}", self.base_url, self.bin_id)
    }

    async fn fetch(&self) -> Result<TaskDocument, StorageError> {
        let response = self
            .client
            .get(format!("{}/latest", self.bin_url()))
            .header(MASTER_KEY_HEADER, &self.master_key)
            .header("X-Bin-Meta", "false")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        // With metadata enabled the document sits under `record`.
        let value = match value {
            serde_json::Value::Object(mut map) if map.contains_key("record") => {
                map.remove("record").unwrap_or_default()
            }
            other => other,
        };
        Ok(TaskDocument::from_json_lenient(value))
    }
}

#[async_trait]
impl TaskStore for JsonBinStore {
    fn backend(&self) -> &'static str {
        "jsonbin"
    }

    async fn load(&self) -> TaskDocument {
        match self.fetch().await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("cannot load task document from jsonbin, using empty: {e}");
                TaskDocument::default()
            }
        }
    }

    async fn save(&self, doc: &TaskDocument) -> Result<(), StorageError> {
        let response = self
            .client
            .put(self.bin_url())
            .header(MASTER_KEY_HEADER, &self.master_key)
            .json(doc)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status { status, body });
        }
        Ok(())
    }
}
