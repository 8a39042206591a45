use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use quiz_core::model::Question;
use storage::repository::{QuestionRecord, QuestionStore};

use crate::error::ApiError;
use crate::signal::UpdateSignal;

/// Transport-agnostic handler for the questions endpoint.
///
/// Callers (an HTTP adapter, a CLI, a test) pass parsed JSON in and get a
/// status code plus JSON body back; this type owns the validation, the store
/// round-trip, and the change broadcast, but never the wire.
pub struct QuestionsApi {
    store: Arc<dyn QuestionStore>,
    signal: UpdateSignal,
    saving_enabled: bool,
}

/// Status code and JSON body for one request.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    #[serde(skip)]
    pub status: u16,
    #[serde(flatten)]
    pub body: ApiBody,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiBody {
    Questions {
        ok: bool,
        questions: Vec<QuestionRecord>,
    },
    Saved {
        ok: bool,
    },
    Error {
        ok: bool,
        error: String,
    },
}

impl ApiResponse {
    fn questions(questions: &[Question]) -> Self {
        Self {
            status: 200,
            body: ApiBody::Questions {
                ok: true,
                questions: questions.iter().map(QuestionRecord::from_question).collect(),
            },
        }
    }

    fn saved() -> Self {
        Self {
            status: 200,
            body: ApiBody::Saved { ok: true },
        }
    }

    fn error(err: &ApiError) -> Self {
        Self {
            status: err.status(),
            body: ApiBody::Error {
                ok: false,
                error: err.to_string(),
            },
        }
    }
}

impl QuestionsApi {
    #[must_use]
    pub fn new(store: Arc<dyn QuestionStore>, signal: UpdateSignal, saving_enabled: bool) -> Self {
        Self {
            store,
            signal,
            saving_enabled,
        }
    }

    /// `GET`: the full question list.
    pub async fn get(&self) -> ApiResponse {
        match self.store.load().await {
            Ok(questions) => ApiResponse::questions(&questions),
            Err(err) => {
                tracing::warn!(error = %err, "question fetch failed");
                ApiResponse::error(&ApiError::Persistence(err))
            }
        }
    }

    /// `POST`: replace the stored question list with the one in `body`.
    pub async fn post(&self, body: Value) -> ApiResponse {
        match self.replace_questions(body).await {
            Ok(()) => ApiResponse::saved(),
            Err(err) => {
                tracing::warn!(error = %err, status = err.status(), "question save rejected");
                ApiResponse::error(&err)
            }
        }
    }

    async fn replace_questions(&self, body: Value) -> Result<(), ApiError> {
        let raw = body
            .get("questions")
            .filter(|v| v.is_array())
            .cloned()
            .ok_or(ApiError::MissingQuestions)?;

        let records: Vec<QuestionRecord> =
            serde_json::from_value(raw).map_err(|_| ApiError::MissingQuestions)?;
        let questions: Vec<Question> = records
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect::<Result<_, _>>()?;

        if !self.saving_enabled {
            return Err(ApiError::NotConfigured);
        }

        self.store
            .save(&questions)
            .await
            .map_err(ApiError::Persistence)?;
        tracing::info!(count = questions.len(), "question list replaced via api");
        self.signal.notify();
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storage::repository::InMemoryStore;

    fn question_json(id: &str) -> Value {
        json!({
            "id": id,
            "prompt": "What is it?",
            "difficulty": "medium",
            "answers": [
                {"text": "right", "correct": true},
                {"text": "wrong 1", "correct": false},
                {"text": "wrong 2", "correct": false},
                {"text": "wrong 3", "correct": false},
            ],
        })
    }

    fn api_over(store: InMemoryStore, saving_enabled: bool) -> (QuestionsApi, UpdateSignal) {
        let signal = UpdateSignal::new();
        let api = QuestionsApi::new(Arc::new(store), signal.clone(), saving_enabled);
        (api, signal)
    }

    #[tokio::test]
    async fn get_returns_the_stored_list() {
        let store = InMemoryStore::new();
        let (api, signal) = api_over(store, true);
        let posted = api
            .post(json!({"questions": [question_json("q-1"), question_json("q-2")]}))
            .await;
        assert_eq!(posted.status, 200);
        drop(signal);

        let response = api.get().await;
        assert_eq!(response.status, 200);
        match response.body {
            ApiBody::Questions { ok, questions } => {
                assert!(ok);
                assert_eq!(questions.len(), 2);
                assert_eq!(questions[0].id, "q-1");
            }
            other => panic!("expected question list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_maps_store_failure_to_500() {
        struct FailingStore;

        #[async_trait::async_trait]
        impl QuestionStore for FailingStore {
            async fn load(
                &self,
            ) -> Result<Vec<Question>, storage::repository::StorageError> {
                Err(storage::repository::StorageError::Http("boom".into()))
            }
            async fn save(
                &self,
                _questions: &[Question],
            ) -> Result<(), storage::repository::StorageError> {
                Ok(())
            }
        }

        let api = QuestionsApi::new(Arc::new(FailingStore), UpdateSignal::new(), true);
        let response = api.get().await;
        assert_eq!(response.status, 500);
        assert!(matches!(response.body, ApiBody::Error { ok: false, .. }));
    }

    #[tokio::test]
    async fn post_without_questions_array_is_400() {
        let (api, _signal) = api_over(InMemoryStore::new(), true);
        for body in [json!({}), json!({"questions": "nope"}), json!(null)] {
            let response = api.post(body).await;
            assert_eq!(response.status, 400);
            match response.body {
                ApiBody::Error { error, .. } => {
                    assert_eq!(error, "Missing questions array in body");
                }
                other => panic!("expected error body, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn post_with_invalid_record_is_422_and_saves_nothing() {
        let store = InMemoryStore::with_questions(Vec::new());
        let (api, _signal) = api_over(store.clone(), true);

        let mut bad = question_json("q-1");
        bad["answers"][1]["correct"] = json!(true);
        let response = api.post(json!({"questions": [bad]})).await;

        assert_eq!(response.status, 422);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn post_without_remote_credentials_is_501() {
        let (api, _signal) = api_over(InMemoryStore::new(), false);
        let response = api.post(json!({"questions": [question_json("q-1")]})).await;
        assert_eq!(response.status, 501);
    }

    #[tokio::test]
    async fn post_failure_in_the_store_is_500() {
        let store = InMemoryStore::new();
        store.set_fail_saves(true);
        let (api, _signal) = api_over(store, true);
        let response = api.post(json!({"questions": [question_json("q-1")]})).await;
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn successful_post_persists_and_notifies() {
        let store = InMemoryStore::new();
        let (api, signal) = api_over(store.clone(), true);
        let mut rx = signal.subscribe();

        let response = api.post(json!({"questions": [question_json("q-1")]})).await;
        assert_eq!(response.status, 200);
        assert!(matches!(response.body, ApiBody::Saved { ok: true }));

        rx.recv().await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[test]
    fn response_bodies_serialize_to_the_wire_shape() {
        let saved = serde_json::to_value(ApiResponse::saved()).unwrap();
        assert_eq!(saved, json!({"ok": true}));

        let error = serde_json::to_value(ApiResponse::error(&ApiError::MissingQuestions)).unwrap();
        assert_eq!(
            error,
            json!({"ok": false, "error": "Missing questions array in body"})
        );
    }
}
