use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use quiz_core::model::Question;

use crate::repository::{QuestionRecord, QuestionStore, StorageError};

/// File-backed question store: a single pretty-printed JSON array on disk.
///
/// Uses the same document layout as the remote store, so an existing
/// `questions.json` can be pointed at directly.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl QuestionStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Question>, StorageError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound);
            }
            Err(err) => return Err(StorageError::Io(err.to_string())),
        };

        let records: Vec<QuestionRecord> =
            serde_json::from_slice(&raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
        records
            .into_iter()
            .map(|r| r.into_question().map_err(StorageError::from))
            .collect()
    }

    async fn save(&self, questions: &[Question]) -> Result<(), StorageError> {
        let records: Vec<QuestionRecord> =
            questions.iter().map(QuestionRecord::from_question).collect();
        let body = serde_json::to_vec_pretty(&records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), count = questions.len(), "saved question file");
        Ok(())
    }
}
