//! UseCase layer error types.

use thiserror::Error;

use crate::domain::{MessagePushError, OptionId, QuestionId, QuizId, RepositoryError};

/// Relay (fan-out) errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The relay was used before the realtime transport was started,
    /// or after it was drained. This is a startup-ordering bug.
    #[error("Realtime transport has not been started")]
    TransportNotStarted,

    #[error(transparent)]
    Push(MessagePushError),
}

impl From<MessagePushError> for RelayError {
    fn from(error: MessagePushError) -> Self {
        match error {
            MessagePushError::TransportNotStarted => RelayError::TransportNotStarted,
            other => RelayError::Push(other),
        }
    }
}

/// Live toggle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToggleLiveError {
    #[error("Quiz {0} not found")]
    QuizNotFound(QuizId),

    #[error("Failed to load quiz: {0}")]
    Repository(RepositoryError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Quiz query errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetQuizError {
    #[error("Quiz {0} not found")]
    QuizNotFound(QuizId),

    #[error("Failed to load quiz: {0}")]
    Repository(RepositoryError),
}

/// Submission errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitQuizError {
    #[error("Quiz {0} not found")]
    QuizNotFound(QuizId),

    #[error("Question {0} does not belong to the quiz")]
    UnknownQuestion(QuestionId),

    #[error("Option {option_id} does not belong to question {question_id}")]
    UnknownOption {
        question_id: QuestionId,
        option_id: OptionId,
    },

    #[error("Question {0} was answered more than once")]
    DuplicateAnswer(QuestionId),

    #[error("The student has already submitted this quiz")]
    AlreadySubmitted,

    #[error("Failed to access submissions: {0}")]
    Repository(RepositoryError),
}
