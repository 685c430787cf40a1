//! Domain error types.

use thiserror::Error;

use super::value_object::QuizId;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{kind} must be a positive integer (got {value})")]
    InvalidId { kind: &'static str, value: i64 },

    #[error("'{0}' is not a numeric id")]
    NotNumeric(String),

    #[error("Invalid room name: '{0}'")]
    InvalidRoomName(String),

    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),
}

/// Persistence collaborator errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Quiz {0} not found")]
    QuizNotFound(QuizId),

    #[error("Record already exists")]
    AlreadyExists,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Realtime transport errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Realtime transport has not been started")]
    TransportNotStarted,
}
