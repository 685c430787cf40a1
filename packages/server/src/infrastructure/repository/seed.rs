//! Quiz seed loader
//!
//! JSON 配列形式のクイズ定義を読み込み、InMemoryQuizRepository の初期データにします。

use std::path::Path;

use thiserror::Error;

use crate::{
    domain::{DomainError, Quiz},
    infrastructure::dto::seed::QuizSeedDto,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid quiz in seed file: {0}")]
    Invalid(#[from] DomainError),
}

/// Parse quizzes from a JSON array.
pub fn parse_quizzes(json: &str) -> Result<Vec<Quiz>, SeedError> {
    let seeds: Vec<QuizSeedDto> = serde_json::from_str(json)?;
    let quizzes = seeds
        .into_iter()
        .map(Quiz::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quizzes)
}

/// Load quizzes from a JSON file.
pub async fn load_quizzes(path: impl AsRef<Path>) -> Result<Vec<Quiz>, SeedError> {
    let json = tokio::fs::read_to_string(path.as_ref()).await?;
    let quizzes = parse_quizzes(&json)?;
    tracing::info!(
        "Loaded {} quiz(zes) from {}",
        quizzes.len(),
        path.as_ref().display()
    );
    Ok(quizzes)
}
