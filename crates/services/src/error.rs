//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionValidationError, SessionError};
use storage::repository::StorageError;

/// Errors emitted by `EditorService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EditorError {
    #[error("no question at index {index}")]
    QuestionIndex { index: usize },
    #[error(transparent)]
    Question(#[from] QuestionValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors behind the questions API handler's non-success responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Malformed request body: 400.
    #[error("Missing questions array in body")]
    MissingQuestions,
    /// A record in the body violates the domain invariants: 422.
    #[error(transparent)]
    InvalidQuestion(#[from] QuestionValidationError),
    /// Remote commits were requested but no credential is configured: 501.
    #[error("remote commits are not configured; set GITHUB_TOKEN to enable saving")]
    NotConfigured,
    /// Local write or remote commit failed: 500.
    #[error(transparent)]
    Persistence(#[from] StorageError),
}

impl ApiError {
    /// HTTP status the transport layer should answer with.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MissingQuestions => 400,
            ApiError::InvalidQuestion(_) => 422,
            ApiError::NotConfigured => 501,
            ApiError::Persistence(_) => 500,
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
