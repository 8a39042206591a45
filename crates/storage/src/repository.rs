use async_trait::async_trait;
use quiz_core::model::{Answer, Difficulty, Question, QuestionDraft, QuestionValidationError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::github::{GitHubConfig, GitHubStore};
use crate::json_file::JsonFileStore;

/// Errors surfaced by question store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflicting write, the stored revision changed underneath us")]
    Conflict,

    #[error("io error: {0}")]
    Io(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    InvalidQuestion(#[from] QuestionValidationError),
}

/// Persisted shape for a question.
///
/// This mirrors the domain `Question` so stores can serialize/deserialize
/// without leaking storage concerns into the domain layer. The JSON layout is
/// the store format: `{id, prompt, difficulty, answers: [{text, correct}]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub answers: Vec<AnswerRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub text: String,
    pub correct: bool,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id().to_owned(),
            prompt: question.prompt().to_owned(),
            difficulty: question.difficulty(),
            answers: question
                .answers()
                .iter()
                .map(|a| AnswerRecord {
                    text: a.text.clone(),
                    correct: a.correct,
                })
                .collect(),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` if the record violates the domain
    /// invariants (blank prompt, wrong answer count, not exactly one correct).
    pub fn into_question(self) -> Result<Question, QuestionValidationError> {
        QuestionDraft {
            id: self.id,
            prompt: self.prompt,
            difficulty: self.difficulty,
            answers: self
                .answers
                .into_iter()
                .map(|a| Answer::new(a.text, a.correct))
                .collect(),
        }
        .validate()
    }
}

/// Capability contract for question persistence.
///
/// The quiz and editor depend on this trait only, never on the transport
/// behind it (local file or remote commit).
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Fetch the full question list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when no list has been stored yet, or
    /// other storage errors.
    async fn load(&self) -> Result<Vec<Question>, StorageError>;

    /// Persist the full question list, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; the previous list is left
    /// untouched in that case.
    async fn save(&self, questions: &[Question]) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
///
/// `fail_saves` turns every `save` into an io error, which exercises the
/// editor's keep-edits-on-failure path.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    questions: Arc<Mutex<Vec<Question>>>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
            fail_saves: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn load(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, questions: &[Question]) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io("simulated save failure".into()));
        }
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = questions.to_vec();
        Ok(())
    }
}

/// Aggregates the question store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            questions: Arc::new(InMemoryStore::new()),
        }
    }

    #[must_use]
    pub fn json_file(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            questions: Arc::new(JsonFileStore::new(path)),
        }
    }

    #[must_use]
    pub fn github(config: GitHubConfig) -> Self {
        Self {
            questions: Arc::new(GitHubStore::new(config)),
        }
    }
}
