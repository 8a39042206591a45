mod ladder;
mod question;
mod session;

pub use ladder::{Ladder, LadderError};
pub use question::{
    ANSWER_COUNT, Answer, Difficulty, Question, QuestionDraft, QuestionValidationError,
};
pub use session::{Advance, AnswerOutcome, Phase, STARTING_LIVES, Session, SessionError};
