//! Conversion logic between DTOs and domain entities, and the WebSocket event codec.

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    AnswerOption, ClassId, DomainError, LiveAnswer, LiveQuizToggle, OptionId, ProfessorId,
    Question, QuestionId, Quiz, QuizId, Submission, SubmittedAnswer, Timestamp, UserId,
};
use crate::infrastructure::dto::{http, seed, websocket as dto};
use classpoll_shared::time::timestamp_to_rfc3339;

// ========================================
// Wire primitives → domain values
// ========================================

impl dto::WireId {
    pub fn to_i64(&self) -> Result<i64, DomainError> {
        match self {
            dto::WireId::Number(value) => Ok(*value),
            dto::WireId::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| DomainError::NotNumeric(text.clone())),
        }
    }
}

impl From<i64> for dto::WireId {
    fn from(value: i64) -> Self {
        dto::WireId::Number(value)
    }
}

impl TryFrom<&dto::WireTimestamp> for Timestamp {
    type Error = DomainError;

    fn try_from(wire: &dto::WireTimestamp) -> Result<Self, Self::Error> {
        match wire {
            dto::WireTimestamp::Millis(millis) => Ok(Timestamp::new(*millis)),
            dto::WireTimestamp::Text(text) => {
                if let Ok(millis) = text.trim().parse::<i64>() {
                    return Ok(Timestamp::new(millis));
                }
                DateTime::parse_from_rfc3339(text.trim())
                    .map(|dt| Timestamp::new(dt.timestamp_millis()))
                    .map_err(|_| DomainError::InvalidTimestamp(text.clone()))
            }
        }
    }
}

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<&dto::LiveAnswerUpdatePayload> for LiveAnswer {
    type Error = DomainError;

    fn try_from(payload: &dto::LiveAnswerUpdatePayload) -> Result<Self, Self::Error> {
        let professor_id = match &payload.professor_id {
            Some(id) => Some(ProfessorId::new(id.to_i64()?)?),
            None => None,
        };

        Ok(Self {
            student_id: UserId::new(payload.student_id.to_i64()?)?,
            student_name: payload.student_name.clone(),
            quiz_id: QuizId::new(payload.quiz_id.to_i64()?)?,
            question_id: QuestionId::new(payload.question_id.to_i64()?)?,
            selected_option_id: OptionId::new(payload.selected_option_id.to_i64()?)?,
            option_text: payload.option_text.clone(),
            timestamp: Timestamp::try_from(&payload.timestamp)?,
            professor_id,
        })
    }
}

impl TryFrom<&dto::LiveQuizTogglePayload> for LiveQuizToggle {
    type Error = DomainError;

    fn try_from(payload: &dto::LiveQuizTogglePayload) -> Result<Self, Self::Error> {
        Ok(Self {
            quiz_id: QuizId::new(payload.quiz_id.to_i64()?)?,
            quiz_title: payload.quiz_title.clone(),
            class_id: ClassId::new(payload.class_id.to_i64()?)?,
            professor_name: payload.professor_name.clone(),
            timestamp: Timestamp::try_from(&payload.timestamp)?,
        })
    }
}

impl TryFrom<seed::QuizSeedDto> for Quiz {
    type Error = DomainError;

    fn try_from(dto: seed::QuizSeedDto) -> Result<Self, Self::Error> {
        let questions = dto
            .questions
            .into_iter()
            .map(|question| {
                let options = question
                    .options
                    .into_iter()
                    .map(|option| {
                        Ok(AnswerOption {
                            id: OptionId::new(option.id)?,
                            text: option.text,
                            is_correct: option.is_correct,
                        })
                    })
                    .collect::<Result<Vec<_>, DomainError>>()?;
                Ok(Question {
                    id: QuestionId::new(question.id)?,
                    text: question.text,
                    options,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Self {
            id: QuizId::new(dto.id)?,
            class_id: ClassId::new(dto.class_id)?,
            professor_id: ProfessorId::new(dto.professor_id)?,
            title: dto.title,
            is_live_active: dto.is_live_active,
            questions,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&LiveQuizToggle> for dto::LiveQuizTogglePayload {
    fn from(model: &LiveQuizToggle) -> Self {
        Self {
            quiz_id: model.quiz_id.value().into(),
            quiz_title: model.quiz_title.clone(),
            class_id: model.class_id.value().into(),
            professor_name: model.professor_name.clone(),
            timestamp: dto::WireTimestamp::Millis(model.timestamp.value()),
        }
    }
}

impl From<&Quiz> for http::QuizSummaryDto {
    fn from(model: &Quiz) -> Self {
        Self {
            quiz_id: model.id.value(),
            class_id: model.class_id.value(),
            professor_id: model.professor_id.value(),
            title: model.title.clone(),
            is_live_active: model.is_live_active,
            question_count: model.questions.len(),
        }
    }
}

impl From<SubmittedAnswer> for http::SubmittedAnswerDto {
    fn from(model: SubmittedAnswer) -> Self {
        Self {
            question_id: model.question_id.value(),
            selected_option_id: model.selected_option_id.value(),
            is_correct: model.is_correct,
        }
    }
}

impl From<Submission> for http::SubmissionDto {
    fn from(model: Submission) -> Self {
        Self {
            id: model.id,
            quiz_id: model.quiz_id.value(),
            student_id: model.student_id.value(),
            score: model.score,
            total_questions: model.total_questions,
            submitted_at: timestamp_to_rfc3339(model.submitted_at.value()),
            answers: model.answers.into_iter().map(Into::into).collect(),
        }
    }
}

// ========================================
// Event codec
// ========================================

/// A decoded client → server event.
///
/// Relayed events keep the original `data` so the fan-out forwards
/// exactly what the client sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinUserRoom(UserId),
    JoinQuizRoom(QuizId),
    JoinProfessorRoom(ProfessorId),
    LiveAnswerUpdate {
        answer: LiveAnswer,
        data: Value,
    },
    LiveQuizToggle {
        toggle: LiveQuizToggle,
        is_live_active: bool,
        data: Value,
    },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Frame is not a JSON envelope: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Event '{0}' cannot be sent by clients")]
    ServerOnlyEvent(String),

    #[error("Invalid payload for '{event}': {reason}")]
    InvalidPayload { event: String, reason: String },
}

fn invalid_payload(event: &str, reason: impl ToString) -> DecodeError {
    DecodeError::InvalidPayload {
        event: event.to_string(),
        reason: reason.to_string(),
    }
}

fn decode_id(event: &str, data: Value) -> Result<i64, DecodeError> {
    let wire: dto::WireId = serde_json::from_value(data).map_err(|e| invalid_payload(event, e))?;
    wire.to_i64().map_err(|e| invalid_payload(event, e))
}

/// Decode one text frame into a `ClientEvent`.
pub fn decode_client_event(text: &str) -> Result<ClientEvent, DecodeError> {
    let envelope: dto::Envelope = serde_json::from_str(text)?;
    let name = envelope.event.as_str();
    let event = dto::EventName::parse(&envelope.event)
        .ok_or_else(|| DecodeError::UnknownEvent(envelope.event.clone()))?;

    match event {
        dto::EventName::JoinUserRoom => {
            let id = decode_id(name, envelope.data)?;
            UserId::new(id)
                .map(ClientEvent::JoinUserRoom)
                .map_err(|e| invalid_payload(name, e))
        }
        dto::EventName::JoinQuizRoom => {
            let id = decode_id(name, envelope.data)?;
            QuizId::new(id)
                .map(ClientEvent::JoinQuizRoom)
                .map_err(|e| invalid_payload(name, e))
        }
        dto::EventName::JoinProfessorRoom => {
            let id = decode_id(name, envelope.data)?;
            ProfessorId::new(id)
                .map(ClientEvent::JoinProfessorRoom)
                .map_err(|e| invalid_payload(name, e))
        }
        dto::EventName::LiveAnswerUpdate => {
            let payload: dto::LiveAnswerUpdatePayload =
                serde_json::from_value(envelope.data.clone())
                    .map_err(|e| invalid_payload(name, e))?;
            let answer = LiveAnswer::try_from(&payload).map_err(|e| invalid_payload(name, e))?;
            Ok(ClientEvent::LiveAnswerUpdate {
                answer,
                data: envelope.data,
            })
        }
        dto::EventName::LiveQuizActivate | dto::EventName::LiveQuizDeactivate => {
            let payload: dto::LiveQuizTogglePayload =
                serde_json::from_value(envelope.data.clone())
                    .map_err(|e| invalid_payload(name, e))?;
            let toggle = LiveQuizToggle::try_from(&payload).map_err(|e| invalid_payload(name, e))?;
            Ok(ClientEvent::LiveQuizToggle {
                toggle,
                is_live_active: event == dto::EventName::LiveQuizActivate,
                data: envelope.data,
            })
        }
        dto::EventName::Connected | dto::EventName::RoomJoined => {
            Err(DecodeError::ServerOnlyEvent(envelope.event.clone()))
        }
    }
}

/// Encode an outbound frame.
pub fn encode_event<T: Serialize>(
    event: dto::EventName,
    data: &T,
) -> Result<String, serde_json::Error> {
    let envelope = dto::Envelope::new(event, serde_json::to_value(data)?);
    serde_json::to_string(&envelope)
}
