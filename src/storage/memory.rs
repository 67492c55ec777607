//! In-process backend used by tests and local experiments.

use crate::storage::{StorageError, TaskStore};
use crate::tasks::TaskDocument;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Holds the document in memory and counts every load and save.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<TaskDocument>,
    fail_saves: AtomicBool,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new(doc: TaskDocument) -> Self {
        Self {
            doc: Mutex::new(doc),
            ..Default::default()
        }
    }

    /// Make every subsequent save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Current stored document.
    pub fn snapshot(&self) -> TaskDocument {
        self.doc.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of save attempts, failed ones included.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> TaskDocument {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match self.doc.lock() {
            Ok(doc) => doc.clone(),
            Err(_) => {
                tracing::warn!("memory store lock poisoned, using empty document");
                TaskDocument::default()
            }
        }
    }

    async fn save(&self, doc: &TaskDocument) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("saves disabled".to_owned()));
        }
        let mut stored = self
            .doc
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_owned()))?;
        *stored = doc.clone();
        Ok(())
    }
}
