use std::sync::Arc;

use quiz_core::Clock;
use storage::repository::Storage;

use crate::api::QuestionsApi;
use crate::config::{RemoteMode, StoreConfig};
use crate::editor_service::EditorService;
use crate::error::AppServicesError;
use crate::quiz_service::QuizService;
use crate::signal::UpdateSignal;

/// Assembles the app-facing services over a single store and change signal.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    editor: Arc<EditorService>,
    api: Arc<QuestionsApi>,
    signal: UpdateSignal,
}

impl AppServices {
    /// Build services from environment-derived store settings: the GitHub
    /// store when a remote is fully configured, the local JSON file otherwise.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the editor's initial load fails for any
    /// reason other than a store that simply does not exist yet.
    pub async fn from_config(config: StoreConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = match config.remote {
            RemoteMode::Configured(github) => Storage::github(github),
            RemoteMode::Disabled | RemoteMode::Missing => {
                Storage::json_file(&config.questions_path)
            }
        };
        Self::new(storage, clock, true).await
    }

    /// Build services over explicit storage. `saving_enabled` feeds the API's
    /// not-configured answer.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the editor's initial load fails for any
    /// reason other than a missing store.
    pub async fn new(
        storage: Storage,
        clock: Clock,
        saving_enabled: bool,
    ) -> Result<Self, AppServicesError> {
        let signal = UpdateSignal::new();
        let quiz = Arc::new(QuizService::new(
            clock,
            Arc::clone(&storage.questions),
            signal.clone(),
        ));
        let editor = Arc::new(EditorService::new(
            Arc::clone(&storage.questions),
            signal.clone(),
        ));
        let api = Arc::new(QuestionsApi::new(
            Arc::clone(&storage.questions),
            signal.clone(),
            saving_enabled,
        ));

        // A brand-new install has no question file yet; start with an empty
        // working copy instead of failing the whole bootstrap.
        match editor.load().await {
            Ok(count) => tracing::info!(count, "question store loaded"),
            Err(crate::error::EditorError::Storage(
                storage::repository::StorageError::NotFound,
            )) => {
                tracing::info!("no question store yet, starting empty");
            }
            Err(crate::error::EditorError::Storage(err)) => return Err(err.into()),
            Err(err) => {
                // load() only surfaces storage errors; anything else is a bug.
                tracing::error!(error = %err, "unexpected editor load failure");
            }
        }

        Ok(Self {
            quiz,
            editor,
            api,
            signal,
        })
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn editor(&self) -> Arc<EditorService> {
        Arc::clone(&self.editor)
    }

    #[must_use]
    pub fn api(&self) -> Arc<QuestionsApi> {
        Arc::clone(&self.api)
    }

    #[must_use]
    pub fn signal(&self) -> UpdateSignal {
        self.signal.clone()
    }
}
