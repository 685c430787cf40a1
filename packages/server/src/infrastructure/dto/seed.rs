//! Seed file DTOs: the quiz fixtures loaded into the in-memory store at startup.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSeedDto {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSeedDto {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub options: Vec<OptionSeedDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSeedDto {
    pub id: i64,
    pub class_id: i64,
    pub professor_id: i64,
    pub title: String,
    #[serde(default)]
    pub is_live_active: bool,
    #[serde(default)]
    pub questions: Vec<QuestionSeedDto>,
}
