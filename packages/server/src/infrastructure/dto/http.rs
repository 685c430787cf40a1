//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::LiveState;

use super::websocket::LiveQuizTogglePayload;

/// `GET /api/quizzes/{quiz_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummaryDto {
    pub quiz_id: i64,
    pub class_id: i64,
    pub professor_id: i64,
    pub title: String,
    pub is_live_active: bool,
    pub question_count: usize,
}

/// `GET /api/quizzes/{quiz_id}/live`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStateDto {
    pub quiz_id: i64,
    /// Value of the `isLiveActive` column
    pub persisted: bool,
    pub state: LiveState,
}

/// `POST /api/quizzes/{quiz_id}/live`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLiveRequest {
    pub is_live_active: bool,
    pub professor_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLiveResponse {
    pub event: String,
    /// Number of sessions the broadcast was handed to
    pub delivered: usize,
    pub data: LiveQuizTogglePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequestDto {
    pub question_id: i64,
    pub selected_option_id: i64,
}

/// `POST /api/quizzes/{quiz_id}/submissions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    pub student_id: i64,
    pub answers: Vec<AnswerRequestDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswerDto {
    pub question_id: i64,
    pub selected_option_id: i64,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDto {
    pub id: String,
    pub quiz_id: i64,
    pub student_id: i64,
    pub score: u32,
    pub total_questions: u32,
    /// RFC 3339
    pub submitted_at: String,
    pub answers: Vec<SubmittedAnswerDto>,
}

/// Error body returned by the HTTP API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
