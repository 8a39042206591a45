use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Number of answers every question carries.
pub const ANSWER_COUNT: usize = 4;

/// Question difficulty tier, persisted in kebab-case to match the stored JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl Difficulty {
    /// All tiers in ascending order, for editors that cycle through them.
    #[must_use]
    pub fn all() -> [Difficulty; 4] {
        [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::VeryHard,
        ]
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::VeryHard => "very-hard",
        }
    }
}

/// A single answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub correct: bool,
}

impl Answer {
    #[must_use]
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

/// Unvalidated question data, as received from an editor form or a store read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: String,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub answers: Vec<Answer>,
}

impl QuestionDraft {
    /// Check the draft against the domain invariants and produce a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` if the id or prompt is blank, the
    /// answer count is not exactly four, or the number of answers flagged
    /// correct is not exactly one.
    pub fn validate(self) -> Result<Question, QuestionValidationError> {
        if self.id.trim().is_empty() {
            return Err(QuestionValidationError::EmptyId);
        }
        if self.prompt.trim().is_empty() {
            return Err(QuestionValidationError::EmptyPrompt { id: self.id });
        }
        if self.answers.len() != ANSWER_COUNT {
            return Err(QuestionValidationError::WrongAnswerCount {
                id: self.id,
                len: self.answers.len(),
            });
        }
        let correct = self.answers.iter().filter(|a| a.correct).count();
        if correct != 1 {
            return Err(QuestionValidationError::CorrectCount {
                id: self.id,
                count: correct,
            });
        }

        Ok(Question {
            id: self.id,
            prompt: self.prompt,
            difficulty: self.difficulty,
            answers: self.answers,
        })
    }
}

/// A validated quiz question: four answers, exactly one of them correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft", into = "QuestionDraft")]
pub struct Question {
    id: String,
    prompt: String,
    difficulty: Difficulty,
    answers: Vec<Answer>,
}

impl Question {
    /// Default skeleton used when the editor adds a new question: answers A–D
    /// with the first one marked correct.
    #[must_use]
    pub fn skeleton() -> Self {
        Self {
            id: format!("q-{}", Uuid::new_v4()),
            prompt: "New question".to_string(),
            difficulty: Difficulty::Easy,
            answers: vec![
                Answer::new("A", true),
                Answer::new("B", false),
                Answer::new("C", false),
                Answer::new("D", false),
            ],
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Position of the correct answer in the stored (unshuffled) order.
    #[must_use]
    pub fn correct_index(&self) -> usize {
        // The one-correct invariant is enforced at construction.
        self.answers
            .iter()
            .position(|a| a.correct)
            .unwrap_or_default()
    }

    /// Replace the prompt text.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError::EmptyPrompt` if the new prompt is blank.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> Result<(), QuestionValidationError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionValidationError::EmptyPrompt {
                id: self.id.clone(),
            });
        }
        self.prompt = prompt;
        Ok(())
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Replace the display text of one answer.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError::AnswerIndex` if `index` is out of range.
    pub fn set_answer_text(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), QuestionValidationError> {
        let answer = self.answers.get_mut(index).ok_or_else(|| {
            QuestionValidationError::AnswerIndex {
                id: self.id.clone(),
                index,
            }
        })?;
        answer.text = text.into();
        Ok(())
    }

    /// Mark one answer as correct and clear the flag on all others, keeping
    /// the single-correct invariant.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError::AnswerIndex` if `index` is out of range.
    pub fn set_correct_answer(&mut self, index: usize) -> Result<(), QuestionValidationError> {
        if index >= self.answers.len() {
            return Err(QuestionValidationError::AnswerIndex {
                id: self.id.clone(),
                index,
            });
        }
        for (i, answer) in self.answers.iter_mut().enumerate() {
            answer.correct = i == index;
        }
        Ok(())
    }
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionValidationError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Question> for QuestionDraft {
    fn from(question: Question) -> Self {
        QuestionDraft {
            id: question.id,
            prompt: question.prompt,
            difficulty: question.difficulty,
            answers: question.answers,
        }
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionValidationError {
    #[error("question id is empty")]
    EmptyId,

    #[error("question {id} has an empty prompt")]
    EmptyPrompt { id: String },

    #[error("question {id} has {len} answers, expected {ANSWER_COUNT}")]
    WrongAnswerCount { id: String, len: usize },

    #[error("question {id} has {count} answers marked correct, expected exactly one")]
    CorrectCount { id: String, count: usize },

    #[error("question {id} has no answer at index {index}")]
    AnswerIndex { id: String, index: usize },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
