//! InMemory Quiz Repository 実装
//!
//! 周辺アプリケーションのクイズテーブルの代わりに HashMap を使います。
//! 起動時にシードファイルから読み込んだクイズで初期化できます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Quiz, QuizId, QuizRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: Mutex<HashMap<QuizId, Quiz>>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `quizzes`.
    /// A later quiz with the same id replaces an earlier one.
    pub fn with_quizzes(quizzes: Vec<Quiz>) -> Self {
        let quizzes = quizzes.into_iter().map(|quiz| (quiz.id, quiz)).collect();
        Self {
            quizzes: Mutex::new(quizzes),
        }
    }

    pub async fn count(&self) -> usize {
        self.quizzes.lock().await.len()
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_quiz(&self, quiz_id: QuizId) -> Result<Option<Quiz>, RepositoryError> {
        let quizzes = self.quizzes.lock().await;
        Ok(quizzes.get(&quiz_id).cloned())
    }

    async fn set_live_active(
        &self,
        quiz_id: QuizId,
        is_live_active: bool,
    ) -> Result<(), RepositoryError> {
        let mut quizzes = self.quizzes.lock().await;
        let quiz = quizzes
            .get_mut(&quiz_id)
            .ok_or(RepositoryError::QuizNotFound(quiz_id))?;
        quiz.is_live_active = is_live_active;
        tracing::debug!("Quiz {} isLiveActive = {}", quiz_id, is_live_active);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClassId, ProfessorId};

    fn quiz(id: i64) -> Quiz {
        Quiz {
            id: QuizId::new(id).unwrap(),
            class_id: ClassId::new(1).unwrap(),
            professor_id: ProfessorId::new(1).unwrap(),
            title: format!("Quiz {}", id),
            is_live_active: false,
            questions: vec![],
        }
    }

    #[tokio::test]
    async fn test_find_quiz() {
        // テスト項目: 登録済みのクイズは取得でき、未登録は None
        // given (前提条件):
        let repo = InMemoryQuizRepository::with_quizzes(vec![quiz(42)]);

        // when (操作):
        let found = repo.find_quiz(QuizId::new(42).unwrap()).await.unwrap();
        let missing = repo.find_quiz(QuizId::new(43).unwrap()).await.unwrap();

        // then (期待する結果):
        assert_eq!(found.unwrap().title, "Quiz 42");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_set_live_active_is_idempotent() {
        // テスト項目: isLiveActive の書き込みは冪等
        // given (前提条件):
        let repo = InMemoryQuizRepository::with_quizzes(vec![quiz(42)]);
        let quiz_id = QuizId::new(42).unwrap();

        // when (操作):
        repo.set_live_active(quiz_id, true).await.unwrap();
        repo.set_live_active(quiz_id, true).await.unwrap();

        // then (期待する結果):
        let stored = repo.find_quiz(quiz_id).await.unwrap().unwrap();
        assert!(stored.is_live_active);
    }

    #[tokio::test]
    async fn test_set_live_active_unknown_quiz() {
        // テスト項目: 存在しないクイズへの書き込みはエラー
        // given (前提条件):
        let repo = InMemoryQuizRepository::new();
        let quiz_id = QuizId::new(1).unwrap();

        // when (操作):
        let result = repo.set_live_active(quiz_id, true).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::QuizNotFound(quiz_id)));
        assert_eq!(repo.count().await, 0);
    }
}
