//! HTTP API client.

use classpoll_server::infrastructure::dto::http::{
    AnswerRequestDto, QuizSummaryDto, SubmissionDto, SubmitQuizRequest, ToggleLiveRequest,
    ToggleLiveResponse,
};
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Derive the WebSocket endpoint from the server's HTTP base URL.
///
/// `http://host:port` → `ws://host:port/ws`, `https://…` → `wss://…/ws`.
pub fn websocket_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/ws", ws_base)
}

/// Thin wrapper over the relay server's HTTP API
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_quiz(&self, quiz_id: i64) -> Result<QuizSummaryDto, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/quizzes/{}", quiz_id)))
            .send()
            .await?;
        parse_response(response).await
    }

    /// Broadcast a live toggle on behalf of a professor
    pub async fn toggle_live(
        &self,
        quiz_id: i64,
        is_live_active: bool,
        professor_name: &str,
    ) -> Result<ToggleLiveResponse, ClientError> {
        let request = ToggleLiveRequest {
            is_live_active,
            professor_name: professor_name.to_string(),
        };
        let response = self
            .client
            .post(self.url(&format!("/api/quizzes/{}/live", quiz_id)))
            .json(&request)
            .send()
            .await?;
        parse_response(response).await
    }

    /// Submit the final answers of a student
    pub async fn submit(
        &self,
        quiz_id: i64,
        student_id: i64,
        answers: &[(i64, i64)],
    ) -> Result<SubmissionDto, ClientError> {
        let request = SubmitQuizRequest {
            student_id,
            answers: answers
                .iter()
                .map(|&(question_id, selected_option_id)| AnswerRequestDto {
                    question_id,
                    selected_option_id,
                })
                .collect(),
        };
        let response = self
            .client
            .post(self.url(&format!("/api/quizzes/{}/submissions", quiz_id)))
            .json(&request)
            .send()
            .await?;
        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

/// Parse `<questionId>:<optionId>` as given on the command line.
pub fn parse_answer_pair(value: &str) -> Result<(i64, i64), ClientError> {
    let invalid = || {
        ClientError::InvalidInput(format!("expected <questionId>:<optionId>, got '{}'", value))
    };
    let (question, option) = value.split_once(':').ok_or_else(invalid)?;
    let question_id = question.trim().parse().map_err(|_| invalid())?;
    let option_id = option.trim().parse().map_err(|_| invalid())?;
    Ok((question_id, option_id))
}
