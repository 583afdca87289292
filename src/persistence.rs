//! Best-effort persistence of error records
//!
//! Persistence is an injectable capability: the engine writes through a
//! `PersistenceBackend` trait object and swallows (logs) any failure, so a
//! slow or broken sink never costs a caller its control flow. The file
//! backend writes one JSON document per record named by `error_id` under a
//! configured directory — local diagnostic storage, not a durable log.

use crate::error::{FaultlineError, FaultlineResult};
use crate::record::ErrorInfo;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Storage capability for error records.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    async fn persist(&self, record: &ErrorInfo) -> FaultlineResult<()>;

    async fn load(&self, error_id: &str) -> FaultlineResult<ErrorInfo>;

    async fn remove(&self, error_id: &str) -> FaultlineResult<()>;
}

/// One pretty-printed JSON file per record under `dir`.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, error_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", error_id))
    }
}

#[async_trait]
impl PersistenceBackend for FileBackend {
    async fn persist(&self, record: &ErrorInfo) -> FaultlineResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(self.record_path(&record.error_id), body).await?;
        Ok(())
    }

    async fn load(&self, error_id: &str) -> FaultlineResult<ErrorInfo> {
        let path = self.record_path(error_id);
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FaultlineError::RecordNotFound {
                    error_id: error_id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&body)?)
    }

    async fn remove(&self, error_id: &str) -> FaultlineResult<()> {
        match tokio::fs::remove_file(self.record_path(error_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FaultlineError::RecordNotFound {
                error_id: error_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory backend for tests and embedding.
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, ErrorInfo>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn persist(&self, record: &ErrorInfo) -> FaultlineResult<()> {
        self.records
            .lock()
            .insert(record.error_id.clone(), record.clone());
        Ok(())
    }

    async fn load(&self, error_id: &str) -> FaultlineResult<ErrorInfo> {
        self.records
            .lock()
            .get(error_id)
            .cloned()
            .ok_or_else(|| FaultlineError::RecordNotFound {
                error_id: error_id.to_string(),
            })
    }

    async fn remove(&self, error_id: &str) -> FaultlineResult<()> {
        self.records
            .lock()
            .remove(error_id)
            .map(|_| ())
            .ok_or_else(|| FaultlineError::RecordNotFound {
                error_id: error_id.to_string(),
            })
    }
}

/// Discards everything. The default when no directory is configured.
pub struct NullBackend;

#[async_trait]
impl PersistenceBackend for NullBackend {
    async fn persist(&self, _record: &ErrorInfo) -> FaultlineResult<()> {
        Ok(())
    }

    async fn load(&self, error_id: &str) -> FaultlineResult<ErrorInfo> {
        Err(FaultlineError::RecordNotFound {
            error_id: error_id.to_string(),
        })
    }

    async fn remove(&self, _error_id: &str) -> FaultlineResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ErrorContext;
    use crate::taxonomy::{Category, Severity};

    fn record(message: &str) -> ErrorInfo {
        ErrorInfo::from_parts(
            "IoError",
            message,
            Severity::High,
            Category::System,
            ErrorContext::new("storage", "write"),
            None,
        )
    }

    #[tokio::test]
    async fn test_file_backend_persist_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        let original = record("disk full");
        backend.persist(&original).await.unwrap();

        let path = dir.path().join(format!("{}.json", original.error_id));
        assert!(path.exists());

        let loaded = backend.load(&original.error_id).await.unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_file_backend_remove() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        let original = record("disk full");
        backend.persist(&original).await.unwrap();
        backend.remove(&original.error_id).await.unwrap();

        let err = backend.load(&original.error_id).await.unwrap_err();
        assert!(matches!(err, FaultlineError::RecordNotFound { .. }));
    }

    #[tokio::test]
    async fn test_file_backend_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        let err = backend.load("0123456789abcdef").await.unwrap_err();
        assert!(matches!(err, FaultlineError::RecordNotFound { .. }));
    }

    #[tokio::test]
    async fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        let original = record("transient");
        backend.persist(&original).await.unwrap();
        assert_eq!(backend.len(), 1);

        let loaded = backend.load(&original.error_id).await.unwrap();
        assert_eq!(loaded, original);

        backend.remove(&original.error_id).await.unwrap();
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_null_backend_accepts_and_forgets() {
        let backend = NullBackend;
        let original = record("anything");
        backend.persist(&original).await.unwrap();
        let err = backend.load(&original.error_id).await.unwrap_err();
        assert!(matches!(err, FaultlineError::RecordNotFound { .. }));
    }
}
