//! HTTP API endpoint handlers.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{DomainError, OptionId, QuestionId, QuizId, UserId},
    infrastructure::dto::{
        encode_event,
        http::{
            ErrorDto, LiveStateDto, QuizSummaryDto, SubmissionDto, SubmitQuizRequest,
            ToggleLiveRequest, ToggleLiveResponse,
        },
        websocket::{EventName, LiveQuizTogglePayload},
    },
    ui::state::AppState,
    usecase::{GetQuizError, RelayError, SubmitQuizError, ToggleLiveError},
};

type ApiError = (StatusCode, Json<ErrorDto>);

fn api_error(status: StatusCode, message: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorDto {
            error: message.to_string(),
        }),
    )
}

fn bad_request(e: DomainError) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, e)
}

fn get_quiz_error(e: GetQuizError) -> ApiError {
    match e {
        GetQuizError::QuizNotFound(_) => api_error(StatusCode::NOT_FOUND, e),
        GetQuizError::Repository(_) => {
            tracing::error!("{}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

fn toggle_error(e: ToggleLiveError) -> ApiError {
    match e {
        ToggleLiveError::QuizNotFound(_) => api_error(StatusCode::NOT_FOUND, e),
        ToggleLiveError::Relay(RelayError::TransportNotStarted) => {
            tracing::error!("{}", e);
            api_error(StatusCode::SERVICE_UNAVAILABLE, e)
        }
        ToggleLiveError::Repository(_) | ToggleLiveError::Relay(RelayError::Push(_)) => {
            tracing::error!("{}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

fn submit_error(e: SubmitQuizError) -> ApiError {
    match e {
        SubmitQuizError::QuizNotFound(_) => api_error(StatusCode::NOT_FOUND, e),
        SubmitQuizError::UnknownQuestion(_)
        | SubmitQuizError::UnknownOption { .. }
        | SubmitQuizError::DuplicateAnswer(_) => api_error(StatusCode::BAD_REQUEST, e),
        SubmitQuizError::AlreadySubmitted => api_error(StatusCode::CONFLICT, e),
        SubmitQuizError::Repository(_) => {
            tracing::error!("{}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint: room name → member count
pub async fn debug_rooms(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, usize>> {
    Json(state.relay.room_snapshot().await)
}

/// Get quiz summary by ID
pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizSummaryDto>, ApiError> {
    let quiz_id = QuizId::new(quiz_id).map_err(bad_request)?;
    let quiz = state
        .get_quiz
        .execute(quiz_id)
        .await
        .map_err(get_quiz_error)?;

    // Domain Model から DTO への変換
    Ok(Json(QuizSummaryDto::from(&quiz)))
}

/// Get persisted flag and protocol state of a quiz
pub async fn get_live_state(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<LiveStateDto>, ApiError> {
    let quiz_id = QuizId::new(quiz_id).map_err(bad_request)?;
    let status = state
        .get_quiz
        .live_status(quiz_id)
        .await
        .map_err(get_quiz_error)?;

    Ok(Json(LiveStateDto {
        quiz_id: status.quiz_id.value(),
        persisted: status.persisted,
        state: status.state,
    }))
}

/// Activate / deactivate a quiz on behalf of a professor
pub async fn toggle_live(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<i64>,
    Json(request): Json<ToggleLiveRequest>,
) -> Result<(StatusCode, Json<ToggleLiveResponse>), ApiError> {
    let quiz_id = QuizId::new(quiz_id).map_err(bad_request)?;
    let toggle = state
        .live_toggle
        .prepare(quiz_id, request.professor_name)
        .await
        .map_err(toggle_error)?;

    let event = EventName::live_toggle(request.is_live_active);
    let data = LiveQuizTogglePayload::from(&toggle);
    let frame = encode_event(event, &data)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    let delivered = state
        .live_toggle
        .toggle(&toggle, request.is_live_active, &frame)
        .await
        .map_err(|e| toggle_error(ToggleLiveError::from(e)))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ToggleLiveResponse {
            event: event.as_str().to_string(),
            delivered,
            data,
        }),
    ))
}

/// Finalize a student's answers
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<i64>,
    Json(request): Json<SubmitQuizRequest>,
) -> Result<(StatusCode, Json<SubmissionDto>), ApiError> {
    // DTO から Domain Model への変換
    let quiz_id = QuizId::new(quiz_id).map_err(bad_request)?;
    let student_id = UserId::new(request.student_id).map_err(bad_request)?;
    let answers = request
        .answers
        .iter()
        .map(|a| {
            Ok((
                QuestionId::new(a.question_id)?,
                OptionId::new(a.selected_option_id)?,
            ))
        })
        .collect::<Result<Vec<_>, DomainError>>()
        .map_err(bad_request)?;

    let submission = state
        .submit_quiz
        .execute(quiz_id, student_id, answers)
        .await
        .map_err(submit_error)?;

    Ok((StatusCode::CREATED, Json(SubmissionDto::from(submission))))
}
