//! UseCase: クイズとライブ状態の取得

use std::sync::Arc;

use crate::domain::{LiveState, Quiz, QuizId, QuizRepository};

use super::{error::GetQuizError, live_toggle::LiveToggleUseCase};

/// Persisted flag and protocol state of one quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveStatus {
    pub quiz_id: QuizId,
    pub persisted: bool,
    pub state: LiveState,
}

/// クイズ取得のユースケース
pub struct GetQuizUseCase {
    quiz_repository: Arc<dyn QuizRepository>,
    live_toggle: Arc<LiveToggleUseCase>,
}

impl GetQuizUseCase {
    pub fn new(
        quiz_repository: Arc<dyn QuizRepository>,
        live_toggle: Arc<LiveToggleUseCase>,
    ) -> Self {
        Self {
            quiz_repository,
            live_toggle,
        }
    }

    pub async fn execute(&self, quiz_id: QuizId) -> Result<Quiz, GetQuizError> {
        self.quiz_repository
            .find_quiz(quiz_id)
            .await
            .map_err(GetQuizError::Repository)?
            .ok_or(GetQuizError::QuizNotFound(quiz_id))
    }

    /// A quiz this process never toggled reports its persisted value as settled.
    pub async fn live_status(&self, quiz_id: QuizId) -> Result<LiveStatus, GetQuizError> {
        let quiz = self.execute(quiz_id).await?;
        let state = self
            .live_toggle
            .state(quiz_id)
            .await
            .unwrap_or(LiveState::confirmed(quiz.is_live_active));
        Ok(LiveStatus {
            quiz_id,
            persisted: quiz.is_live_active,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClassId, ProfessorId};
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryQuizRepository, InMemoryRoomRepository},
    };
    use crate::usecase::live_toggle::DEFAULT_CONFIRM_DELAY;
    use classpoll_shared::time::FixedClock;

    fn quiz(id: i64, is_live_active: bool) -> Quiz {
        Quiz {
            id: QuizId::new(id).unwrap(),
            class_id: ClassId::new(3).unwrap(),
            professor_id: ProfessorId::new(2).unwrap(),
            title: "Cell Biology".to_string(),
            is_live_active,
            questions: vec![],
        }
    }

    fn usecase(quizzes: Vec<Quiz>) -> GetQuizUseCase {
        let store = Arc::new(InMemoryQuizRepository::with_quizzes(quizzes));
        let live_toggle = Arc::new(LiveToggleUseCase::new(
            store.clone(),
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(FixedClock::new(0)),
            DEFAULT_CONFIRM_DELAY,
        ));
        GetQuizUseCase::new(store, live_toggle)
    }

    #[tokio::test]
    async fn test_untoggled_quiz_reports_persisted_state() {
        // テスト項目: このプロセスで toggle されていないクイズは永続値をそのまま報告する
        // given (前提条件):
        let usecase = usecase(vec![quiz(42, true)]);

        // when (操作):
        let status = usecase.live_status(QuizId::new(42).unwrap()).await.unwrap();

        // then (期待する結果):
        assert!(status.persisted);
        assert_eq!(status.state, LiveState::Active);
    }

    #[tokio::test]
    async fn test_unknown_quiz_is_not_found() {
        // テスト項目: 存在しないクイズは QuizNotFound
        // given (前提条件):
        let usecase = usecase(vec![]);

        // when (操作):
        let result = usecase.execute(QuizId::new(1).unwrap()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(GetQuizError::QuizNotFound(QuizId::new(1).unwrap()))
        );
    }
}
