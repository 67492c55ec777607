//! Persistence backends for the task document.
//!
//! The router only sees [`TaskStore`]. Loading never fails outward: any
//! fetch or parse problem is logged and the empty document is returned.
//! Saving reports its outcome so the caller can decide what to tell the
//! user.

pub mod file;
pub mod jsonbin;
pub mod memory;

use crate::config::{BotConfig, StorageConfig};
use crate::tasks::TaskDocument;
use async_trait::async_trait;
use std::sync::Arc;

/// Persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend refused the operation for a non-transport reason.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Full-document load/save capability.
///
/// No caching and no versioning: every `load` is a fresh read and every
/// `save` overwrites whatever is stored.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Short backend name for logs and the health probe.
    fn backend(&self) -> &'static str;

    /// Fetch the current document, or the empty document on any failure.
    async fn load(&self) -> TaskDocument;

    /// Replace the stored document with `doc`.
    async fn save(&self, doc: &TaskDocument) -> Result<(), StorageError>;
}

/// Build the backend selected in `config`.
pub fn from_config(config: &BotConfig) -> Result<Arc<dyn TaskStore>, StorageError> {
    let store: Arc<dyn TaskStore> = match &config.storage {
        StorageConfig::JsonBin(bin) => Arc::new(jsonbin::JsonBinStore::new(bin, config.http_timeout)?),
        StorageConfig::File { path } => Arc::new(file::FileStore::new(path.clone())),
    };
    tracing::info!("task storage backend: {}", store.backend());
    Ok(store)
}
