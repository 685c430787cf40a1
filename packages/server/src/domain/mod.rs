//! Domain layer: value objects, entities and the ports the use cases depend on.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{
    AnswerOption, LiveAnswer, LiveQuizToggle, LiveState, Question, Quiz, Submission,
    SubmittedAnswer,
};
pub use error::{DomainError, MessagePushError, RepositoryError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{QuizRepository, RoomRepository, SubmissionRepository};
pub use value_object::{
    ClassId, OptionId, ProfessorId, QuestionId, QuizId, RoomName, SessionId, SessionIdFactory,
    Timestamp, UserId,
};

#[cfg(test)]
pub use repository::{MockQuizRepository, MockSubmissionRepository};
