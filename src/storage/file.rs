//! Local JSON file backend, handy for running without a JSONBin account.

use crate::storage::{StorageError, TaskStore};
use crate::tasks::TaskDocument;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<TaskDocument, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet", self.path.display());
                return Ok(TaskDocument::default());
            }
            Err(e) => return Err(e.into()),
        };
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(TaskDocument::from_json_lenient(value))
    }
}

#[async_trait]
impl TaskStore for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> TaskDocument {
        match self.read().await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    "cannot load task document from {}, using empty: {e}",
                    self.path.display()
                );
                TaskDocument::default()
            }
        }
    }

    async fn save(&self, doc: &TaskDocument) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(doc)?;
        // Write beside the target and rename so readers never see half a file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("tasks.json"));
        assert_eq!(store.load().await, TaskDocument::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("tasks.json"));
        let doc = TaskDocument {
            weekday: vec!["stand-up".to_owned()],
            weekend: vec!["brunch".to_owned(), "brunch".to_owned()],
        };
        store.save(&doc).await.unwrap();
        assert_eq!(store.load().await, doc);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileStore::new(path);
        assert_eq!(store.load().await, TaskDocument::default());
    }

    #[tokio::test]
    async fn save_into_unwritable_location_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not dir").unwrap();
        let store = FileStore::new(blocker.join("tasks.json"));
        assert!(store.save(&TaskDocument::default()).await.is_err());
    }
}
