use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::broadcast;

use quiz_core::Clock;
use quiz_core::model::{Advance, Ladder, Session};
use storage::repository::QuestionStore;

use crate::error::QuizError;
use crate::signal::UpdateSignal;

/// Orchestrates quiz play: starts sessions from the store, supplies fresh
/// answer shuffles, and exposes the "questions changed" subscription.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    ladder: Ladder,
    store: Arc<dyn QuestionStore>,
    signal: UpdateSignal,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn QuestionStore>, signal: UpdateSignal) -> Self {
        Self {
            clock,
            ladder: Ladder::standard(),
            store,
            signal,
        }
    }

    #[must_use]
    pub fn with_ladder(mut self, ladder: Ladder) -> Self {
        self.ladder = ladder;
        self
    }

    #[must_use]
    pub fn ladder(&self) -> &Ladder {
        &self.ladder
    }

    /// Start a new session over the store's current question list, with the
    /// first question already shuffled.
    ///
    /// A session holds on to the list it started with; a store update only
    /// affects sessions started afterwards.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the fetch fails (the caller keeps
    /// whatever it had and may retry) and `QuizError::Session` when the store
    /// holds no questions.
    pub async fn start_session(&self) -> Result<Session, QuizError> {
        let questions = self.store.load().await?;
        tracing::debug!(count = questions.len(), "starting quiz session");
        let mut session = Session::new(self.ladder.clone(), questions, self.clock.now())?;
        let order = shuffled_order(answer_count(&session));
        session.begin_question(order)?;
        Ok(session)
    }

    /// Dismiss the lives overlay and, when the session moves on, install a
    /// fresh shuffle for the incoming question.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` via `QuizError::Session`; in particular the
    /// pending-checkpoint gate.
    pub fn acknowledge_lives(&self, session: &mut Session) -> Result<Advance, QuizError> {
        let advance = session.acknowledge_lives(self.clock.now())?;
        if advance == Advance::NextQuestion {
            session.begin_question(shuffled_order(answer_count(session)))?;
        }
        Ok(advance)
    }

    /// Listen for "questions changed, reload" broadcasts.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.signal.subscribe()
    }
}

fn answer_count(session: &Session) -> usize {
    session
        .current_question()
        .map(|q| q.answers().len())
        .unwrap_or_default()
}

/// A uniformly random display order for `len` answers.
#[must_use]
pub fn shuffled_order(len: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(&mut rand::rng());
    order
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Answer, Difficulty, Question, QuestionDraft, SessionError};
    use quiz_core::time::fixed_clock;
    use storage::repository::InMemoryStore;

    fn build_question(n: usize) -> Question {
        QuestionDraft {
            id: format!("q-{n}"),
            prompt: format!("Question {n}"),
            difficulty: Difficulty::Easy,
            answers: vec![
                Answer::new("right", true),
                Answer::new("wrong 1", false),
                Answer::new("wrong 2", false),
                Answer::new("wrong 3", false),
            ],
        }
        .validate()
        .unwrap()
    }

    fn service_with(questions: Vec<Question>) -> QuizService {
        let store = InMemoryStore::with_questions(questions);
        QuizService::new(fixed_clock(), Arc::new(store), UpdateSignal::new())
    }

    #[tokio::test]
    async fn start_session_shuffles_and_keeps_all_answers() {
        let service = service_with(vec![build_question(1)]);
        let session = service.start_session().await.unwrap();

        let mut texts: Vec<&str> = session
            .displayed_answers()
            .iter()
            .map(|a| a.text.as_str())
            .collect();
        texts.sort_unstable();
        assert_eq!(texts, vec!["right", "wrong 1", "wrong 2", "wrong 3"]);
        assert!(session.correct_display_index().is_some());
    }

    #[tokio::test]
    async fn empty_store_cannot_start_a_session() {
        let service = service_with(Vec::new());
        let err = service.start_session().await.unwrap_err();
        assert!(matches!(err, QuizError::Session(SessionError::Empty)));
    }

    #[tokio::test]
    async fn advancing_reshuffles_the_next_question() {
        let service = service_with((0..3).map(build_question).collect());
        let mut session = service.start_session().await.unwrap();

        let correct = session.correct_display_index().unwrap();
        session.submit_answer(correct).unwrap();
        session.acknowledge_reward().unwrap();
        assert_eq!(
            service.acknowledge_lives(&mut session).unwrap(),
            Advance::NextQuestion
        );

        assert_eq!(session.question_index(), 1);
        assert_eq!(session.selected(), None);
        assert_eq!(session.displayed_answers().len(), 4);
        assert!(session.correct_display_index().is_some());
    }

    #[test]
    fn shuffle_places_the_first_answer_uniformly() {
        // 4000 shuffles, expected 1000 per position, tolerance well beyond 5σ.
        const TRIALS: usize = 4000;
        let mut counts = [0usize; 4];
        for _ in 0..TRIALS {
            let order = shuffled_order(4);
            let position = order.iter().position(|i| *i == 0).unwrap();
            counts[position] += 1;
        }
        for count in counts {
            assert!(
                (850..=1150).contains(&count),
                "position counts too skewed: {counts:?}"
            );
        }
    }

    #[test]
    fn shuffled_order_is_always_a_permutation() {
        for _ in 0..100 {
            let mut order = shuffled_order(4);
            order.sort_unstable();
            assert_eq!(order, vec![0, 1, 2, 3]);
        }
    }
}
