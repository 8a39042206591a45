use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{Answer, Ladder, Question};

/// Lives a fresh session starts with.
pub const STARTING_LIVES: u8 = 3;

//
// ─── SESSION ERRORS ────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,

    #[error("session already finished")]
    Finished,

    #[error("operation not valid in phase {phase:?}")]
    WrongPhase { phase: Phase },

    #[error("no answer at display index {index}")]
    AnswerIndex { index: usize },

    #[error("answer order is not a permutation of the question's answers")]
    InvalidOrder,

    #[error("pending checkpoints must be acknowledged first")]
    CheckpointsPending,

    #[error("no pending checkpoint to acknowledge")]
    NoPendingCheckpoint,
}

//
// ─── PHASES AND TRANSITION RESULTS ─────────────────────────────────────────────
//

/// Where the session sits in its overlay-acknowledgment cycle.
///
/// `Answering` → `Revealed` (answer submitted, reward shown) →
/// `AcknowledgingLives` (lives overlay shown) → `Answering` for the next
/// question, or `Finished`. Pending checkpoints block the exit from
/// `AcknowledgingLives` until drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Answering,
    Revealed,
    AcknowledgingLives,
    Finished,
}

/// What submitting an answer did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub bank: u64,
    pub lives: u8,
    /// Terminal value the reveal animation should count up to.
    pub reveal_target: u64,
    /// Checkpoints that became due with this answer, ascending.
    pub new_checkpoints: Vec<u64>,
}

/// Result of dismissing the lives overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the next question; the caller must supply a fresh shuffled
    /// answer order via [`Session::begin_question`].
    NextQuestion,
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through of the quiz: question progress, lives, banked amount and
/// the overlay/checkpoint acknowledgment queue.
///
/// All transitions are synchronous and pure; timestamps come from the caller
/// so behavior stays deterministic under test.
pub struct Session {
    ladder: Ladder,
    questions: Vec<Question>,
    question_index: usize,
    /// Display order for the current question's answers (display → stored).
    order: Vec<usize>,
    selected: Option<usize>,
    lives: u8,
    bank: u64,
    score: u32,
    seen_checkpoints: Vec<u64>,
    /// Stack of checkpoints awaiting acknowledgment, drained last-in-first-out.
    pending_checkpoints: Vec<u64>,
    phase: Phase,
    eliminated: bool,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Start a session over the given questions.
    ///
    /// The first question begins with the stored answer order; callers that
    /// want a shuffled presentation follow up with [`Session::begin_question`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn new(
        ladder: Ladder,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let order = (0..questions[0].answers().len()).collect();
        Ok(Self {
            ladder,
            questions,
            question_index: 0,
            order,
            selected: None,
            lives: STARTING_LIVES,
            bank: 0,
            score: 0,
            seen_checkpoints: Vec::new(),
            pending_checkpoints: Vec::new(),
            phase: Phase::Answering,
            eliminated: false,
            started_at,
            finished_at: None,
        })
    }

    #[must_use]
    pub fn ladder(&self) -> &Ladder {
        &self.ladder
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn lives(&self) -> u8 {
        self.lives
    }

    #[must_use]
    pub fn bank(&self) -> u64 {
        self.bank
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn seen_checkpoints(&self) -> &[u64] {
        &self.seen_checkpoints
    }

    #[must_use]
    pub fn pending_checkpoints(&self) -> &[u64] {
        &self.pending_checkpoints
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            None
        } else {
            self.questions.get(self.question_index)
        }
    }

    /// The current question's answers in display order.
    #[must_use]
    pub fn displayed_answers(&self) -> Vec<&Answer> {
        let Some(question) = self.current_question() else {
            return Vec::new();
        };
        self.order
            .iter()
            .filter_map(|i| question.answers().get(*i))
            .collect()
    }

    /// Display position of the correct answer for the current question.
    #[must_use]
    pub fn correct_display_index(&self) -> Option<usize> {
        let question = self.current_question()?;
        self.order
            .iter()
            .position(|i| question.answers().get(*i).is_some_and(|a| a.correct))
    }

    /// Install a fresh answer display order for the current question.
    ///
    /// Only valid while the question is still unanswered. `order` maps display
    /// positions to stored answer positions and must be a permutation.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` outside of `Answering`, and
    /// `SessionError::InvalidOrder` if `order` is not a permutation of the
    /// current question's answer indices.
    pub fn begin_question(&mut self, order: Vec<usize>) -> Result<(), SessionError> {
        if self.phase != Phase::Answering {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        let len = self
            .current_question()
            .map(|q| q.answers().len())
            .unwrap_or_default();
        let mut check: Vec<usize> = order.clone();
        check.sort_unstable();
        if check != (0..len).collect::<Vec<_>>() {
            return Err(SessionError::InvalidOrder);
        }
        self.order = order;
        self.selected = None;
        Ok(())
    }

    /// Submit the answer at `display_index` for the current question.
    ///
    /// Correct: score and bank climb one rung. Wrong: one life is lost, and
    /// losing the last life collapses the bank to the last checkpoint (or 0).
    /// Either way, checkpoints newly reached by the resulting bank are queued
    /// for acknowledgment and the session moves to `Revealed`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` unless the session is `Answering`,
    /// `SessionError::CheckpointsPending` while an overlay is still due, and
    /// `SessionError::AnswerIndex` for an out-of-range index.
    pub fn submit_answer(&mut self, display_index: usize) -> Result<AnswerOutcome, SessionError> {
        if self.phase != Phase::Answering {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        if !self.pending_checkpoints.is_empty() {
            return Err(SessionError::CheckpointsPending);
        }
        let stored_index = *self
            .order
            .get(display_index)
            .ok_or(SessionError::AnswerIndex {
                index: display_index,
            })?;
        let correct = self.questions[self.question_index]
            .answers()
            .get(stored_index)
            .ok_or(SessionError::AnswerIndex {
                index: display_index,
            })?
            .correct;

        self.selected = Some(display_index);

        if correct {
            self.score += 1;
            self.bank = self.ladder.next_value(self.bank);
        } else {
            self.lives = self.lives.saturating_sub(1);
            if self.lives == 0 {
                self.bank = self.ladder.last_checkpoint_at_or_below(self.bank);
            }
        }

        let new_checkpoints = self
            .ladder
            .newly_reached_checkpoints(self.bank, &self.seen_checkpoints);
        for cp in &new_checkpoints {
            self.seen_checkpoints.push(*cp);
            self.pending_checkpoints.push(*cp);
        }

        self.phase = Phase::Revealed;

        Ok(AnswerOutcome {
            correct,
            bank: self.bank,
            lives: self.lives,
            reveal_target: self.bank,
            new_checkpoints,
        })
    }

    /// Dismiss the reward overlay and present the lives overlay.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` unless the session is `Revealed`.
    pub fn acknowledge_reward(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Revealed {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        self.phase = Phase::AcknowledgingLives;
        Ok(())
    }

    /// Dismiss the lives overlay, advancing to the next question or finishing.
    ///
    /// With no lives left the session finishes immediately, even if questions
    /// remain. Otherwise it advances while questions remain; the new question
    /// needs a fresh order via [`Session::begin_question`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` unless the session is
    /// `AcknowledgingLives`, and `SessionError::CheckpointsPending` while the
    /// checkpoint queue is not drained.
    pub fn acknowledge_lives(&mut self, at: DateTime<Utc>) -> Result<Advance, SessionError> {
        if self.phase != Phase::AcknowledgingLives {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        if !self.pending_checkpoints.is_empty() {
            return Err(SessionError::CheckpointsPending);
        }

        if self.lives == 0 {
            self.finish(at, true);
            return Ok(Advance::Finished);
        }

        if self.question_index + 1 < self.questions.len() {
            self.question_index += 1;
            self.order = (0..self.questions[self.question_index].answers().len()).collect();
            self.selected = None;
            self.phase = Phase::Answering;
            Ok(Advance::NextQuestion)
        } else {
            self.finish(at, false);
            Ok(Advance::Finished)
        }
    }

    /// Dismiss the most recently queued checkpoint overlay.
    ///
    /// Checkpoints drain last-in-first-out and may be acknowledged at any
    /// point of the overlay cycle before the session proceeds.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` on a finished session and
    /// `SessionError::NoPendingCheckpoint` when the queue is empty.
    pub fn acknowledge_checkpoint(&mut self) -> Result<u64, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        self.pending_checkpoints
            .pop()
            .ok_or(SessionError::NoPendingCheckpoint)
    }

    /// Final amount shown once the session is finished: the checkpoint
    /// fallback after elimination, the bank itself otherwise.
    #[must_use]
    pub fn final_amount(&self) -> Option<u64> {
        if !self.is_finished() {
            return None;
        }
        if self.eliminated {
            Some(self.ladder.last_checkpoint_at_or_below(self.bank))
        } else {
            Some(self.bank)
        }
    }

    #[must_use]
    pub fn eliminated(&self) -> bool {
        self.eliminated
    }

    fn finish(&mut self, at: DateTime<Utc>, eliminated: bool) {
        self.phase = Phase::Finished;
        self.eliminated = eliminated;
        self.finished_at = Some(at);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("question_index", &self.question_index)
            .field("lives", &self.lives)
            .field("bank", &self.bank)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .field("pending_checkpoints", &self.pending_checkpoints)
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
