use std::sync::{Arc, Mutex};

use quiz_core::model::{Difficulty, Question};
use storage::repository::{QuestionStore, StorageError};

use crate::error::EditorError;
use crate::signal::UpdateSignal;

/// Admin editor over the question store.
///
/// Holds an in-memory working copy of the question list. Edits apply to the
/// working copy only; `save` pushes the whole list to the store. A failed save
/// keeps the working copy intact so the operator can retry.
pub struct EditorService {
    store: Arc<dyn QuestionStore>,
    signal: UpdateSignal,
    working: Mutex<Vec<Question>>,
}

impl EditorService {
    #[must_use]
    pub fn new(store: Arc<dyn QuestionStore>, signal: UpdateSignal) -> Self {
        Self {
            store,
            signal,
            working: Mutex::new(Vec::new()),
        }
    }

    /// Replace the working copy with the store's current list.
    ///
    /// On failure the previous working copy is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Storage` if the store read fails.
    pub async fn load(&self) -> Result<usize, EditorError> {
        let questions = self.store.load().await?;
        let count = questions.len();
        *self.lock()? = questions;
        Ok(count)
    }

    /// Snapshot of the current working copy.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Storage` if the working copy lock is poisoned.
    pub fn questions(&self) -> Result<Vec<Question>, EditorError> {
        Ok(self.lock()?.clone())
    }

    /// Append a default question skeleton and return it.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Storage` if the working copy lock is poisoned.
    pub fn add_question(&self) -> Result<Question, EditorError> {
        let question = Question::skeleton();
        self.lock()?.push(question.clone());
        Ok(question)
    }

    /// Remove and return the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::QuestionIndex` if `index` is out of range.
    pub fn remove_question(&self, index: usize) -> Result<Question, EditorError> {
        let mut guard = self.lock()?;
        if index >= guard.len() {
            return Err(EditorError::QuestionIndex { index });
        }
        Ok(guard.remove(index))
    }

    /// Replace the prompt of the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::QuestionIndex` for an unknown index and
    /// `EditorError::Question` if the new prompt is blank.
    pub fn set_prompt(&self, index: usize, prompt: impl Into<String>) -> Result<(), EditorError> {
        let mut guard = self.lock()?;
        let question = guard
            .get_mut(index)
            .ok_or(EditorError::QuestionIndex { index })?;
        question.set_prompt(prompt)?;
        Ok(())
    }

    /// Set the difficulty of the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::QuestionIndex` for an unknown index.
    pub fn set_difficulty(&self, index: usize, difficulty: Difficulty) -> Result<(), EditorError> {
        let mut guard = self.lock()?;
        let question = guard
            .get_mut(index)
            .ok_or(EditorError::QuestionIndex { index })?;
        question.set_difficulty(difficulty);
        Ok(())
    }

    /// Replace the display text of one answer of the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::QuestionIndex` for an unknown question and
    /// `EditorError::Question` for an unknown answer position.
    pub fn set_answer_text(
        &self,
        index: usize,
        answer_index: usize,
        text: impl Into<String>,
    ) -> Result<(), EditorError> {
        let mut guard = self.lock()?;
        let question = guard
            .get_mut(index)
            .ok_or(EditorError::QuestionIndex { index })?;
        question.set_answer_text(answer_index, text)?;
        Ok(())
    }

    /// Mark one answer of the question at `index` as the correct one, clearing
    /// the flag on the other three.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::QuestionIndex` for an unknown question and
    /// `EditorError::Question` for an unknown answer position.
    pub fn set_correct_answer(&self, index: usize, answer_index: usize) -> Result<(), EditorError> {
        let mut guard = self.lock()?;
        let question = guard
            .get_mut(index)
            .ok_or(EditorError::QuestionIndex { index })?;
        question.set_correct_answer(answer_index)?;
        Ok(())
    }

    /// Persist the working copy and notify listeners on success.
    ///
    /// The working copy survives a failed save so the operator can retry.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Storage` if the store write fails.
    pub async fn save(&self) -> Result<(), EditorError> {
        let snapshot = self.questions()?;
        match self.store.save(&snapshot).await {
            Ok(()) => {
                tracing::info!(count = snapshot.len(), "question list saved");
                self.signal.notify();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "question save failed, edits kept in memory");
                Err(err.into())
            }
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Question>>, StorageError> {
        self.working
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Answer, QuestionDraft};
    use storage::repository::InMemoryStore;

    fn build_question(n: usize) -> Question {
        QuestionDraft {
            id: format!("q-{n}"),
            prompt: format!("Question {n}"),
            difficulty: Difficulty::Easy,
            answers: vec![
                Answer::new("a", true),
                Answer::new("b", false),
                Answer::new("c", false),
                Answer::new("d", false),
            ],
        }
        .validate()
        .unwrap()
    }

    fn editor_with(questions: Vec<Question>) -> (EditorService, InMemoryStore) {
        let store = InMemoryStore::with_questions(questions);
        let editor = EditorService::new(Arc::new(store.clone()), UpdateSignal::new());
        (editor, store)
    }

    #[tokio::test]
    async fn load_reads_through_to_the_store() {
        let (editor, _store) = editor_with(vec![build_question(1), build_question(2)]);
        assert_eq!(editor.load().await.unwrap(), 2);
        assert_eq!(editor.questions().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn add_question_appends_a_valid_skeleton() {
        let (editor, _store) = editor_with(Vec::new());
        editor.load().await.unwrap();
        let added = editor.add_question().unwrap();
        assert_eq!(added.prompt(), "New question");
        assert_eq!(added.correct_index(), 0);
        assert_eq!(editor.questions().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_correct_answer_keeps_exactly_one_correct() {
        let (editor, _store) = editor_with(vec![build_question(1)]);
        editor.load().await.unwrap();

        // An arbitrary edit sequence never leaves more or less than one flag set.
        editor.set_correct_answer(0, 2).unwrap();
        editor.set_correct_answer(0, 3).unwrap();
        editor.set_correct_answer(0, 1).unwrap();

        let question = &editor.questions().unwrap()[0];
        let correct: Vec<bool> = question.answers().iter().map(|a| a.correct).collect();
        assert_eq!(correct.iter().filter(|c| **c).count(), 1);
        assert_eq!(question.correct_index(), 1);
    }

    #[tokio::test]
    async fn remove_question_by_position() {
        let (editor, _store) = editor_with(vec![build_question(1), build_question(2)]);
        editor.load().await.unwrap();
        let removed = editor.remove_question(0).unwrap();
        assert_eq!(removed.id(), "q-1");
        assert_eq!(editor.questions().unwrap()[0].id(), "q-2");

        let err = editor.remove_question(5).unwrap_err();
        assert!(matches!(err, EditorError::QuestionIndex { index: 5 }));
    }

    #[tokio::test]
    async fn save_persists_and_notifies() {
        let store = InMemoryStore::with_questions(vec![build_question(1)]);
        let signal = UpdateSignal::new();
        let editor = EditorService::new(Arc::new(store.clone()), signal.clone());
        editor.load().await.unwrap();
        let mut rx = signal.subscribe();

        editor.set_prompt(0, "Edited prompt").unwrap();
        editor.save().await.unwrap();

        rx.recv().await.unwrap();
        let persisted = store.load().await.unwrap();
        assert_eq!(persisted[0].prompt(), "Edited prompt");
    }

    #[tokio::test]
    async fn failed_save_keeps_edits_for_retry() {
        let (editor, store) = editor_with(vec![build_question(1)]);
        editor.load().await.unwrap();
        editor.set_prompt(0, "Edited prompt").unwrap();

        store.set_fail_saves(true);
        let err = editor.save().await.unwrap_err();
        assert!(matches!(err, EditorError::Storage(_)));
        // Edits are still there; a retry after the store recovers succeeds.
        assert_eq!(editor.questions().unwrap()[0].prompt(), "Edited prompt");

        store.set_fail_saves(false);
        editor.save().await.unwrap();
        assert_eq!(store.load().await.unwrap()[0].prompt(), "Edited prompt");
    }

    #[tokio::test]
    async fn blank_prompt_edit_is_rejected() {
        let (editor, _store) = editor_with(vec![build_question(1)]);
        editor.load().await.unwrap();
        let err = editor.set_prompt(0, "   ").unwrap_err();
        assert!(matches!(err, EditorError::Question(_)));
        assert_eq!(editor.questions().unwrap()[0].prompt(), "Question 1");
    }
}
