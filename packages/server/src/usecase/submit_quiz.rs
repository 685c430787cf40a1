//! UseCase: クイズの最終提出
//!
//! ライブ中継とは独立しており、中継の状態は一切参照しません。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 正解数がスコアになり、設問数が totalQuestions になること
//! - 存在しないクイズ・設問・選択肢、重複回答がエラーになること
//! - 同じ学生による 2 回目の提出が拒否されること

use std::{collections::HashSet, sync::Arc};

use classpoll_shared::time::Clock;
use uuid::Uuid;

use crate::domain::{
    OptionId, QuestionId, QuizId, QuizRepository, RepositoryError, Submission,
    SubmissionRepository, SubmittedAnswer, Timestamp, UserId,
};

use super::error::SubmitQuizError;

/// クイズ提出のユースケース
pub struct SubmitQuizUseCase {
    quiz_repository: Arc<dyn QuizRepository>,
    submission_repository: Arc<dyn SubmissionRepository>,
    clock: Arc<dyn Clock>,
}

impl SubmitQuizUseCase {
    pub fn new(
        quiz_repository: Arc<dyn QuizRepository>,
        submission_repository: Arc<dyn SubmissionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            quiz_repository,
            submission_repository,
            clock,
        }
    }

    /// 回答を採点して保存する
    ///
    /// # Arguments
    ///
    /// * `quiz_id` - 対象クイズ
    /// * `student_id` - 提出する学生
    /// * `answers` - (設問 ID, 選択肢 ID) の組
    ///
    /// # Returns
    ///
    /// * `Ok(Submission)` - 保存された提出
    /// * `Err(SubmitQuizError)` - 検証または保存の失敗
    pub async fn execute(
        &self,
        quiz_id: QuizId,
        student_id: UserId,
        answers: Vec<(QuestionId, OptionId)>,
    ) -> Result<Submission, SubmitQuizError> {
        // 1. クイズの取得
        let quiz = self
            .quiz_repository
            .find_quiz(quiz_id)
            .await
            .map_err(SubmitQuizError::Repository)?
            .ok_or(SubmitQuizError::QuizNotFound(quiz_id))?;

        // 2. 提出済みか確認
        if self
            .submission_repository
            .find_by_student(quiz_id, student_id)
            .await
            .map_err(SubmitQuizError::Repository)?
            .is_some()
        {
            return Err(SubmitQuizError::AlreadySubmitted);
        }

        // 3. 採点
        let mut answered = HashSet::new();
        let mut graded = Vec::with_capacity(answers.len());
        for (question_id, option_id) in answers {
            let question = quiz
                .find_question(question_id)
                .ok_or(SubmitQuizError::UnknownQuestion(question_id))?;
            let option =
                question
                    .find_option(option_id)
                    .ok_or(SubmitQuizError::UnknownOption {
                        question_id,
                        option_id,
                    })?;
            if !answered.insert(question_id) {
                return Err(SubmitQuizError::DuplicateAnswer(question_id));
            }
            graded.push(SubmittedAnswer {
                question_id,
                selected_option_id: option_id,
                is_correct: option.is_correct,
            });
        }

        let score = graded.iter().filter(|a| a.is_correct).count() as u32;
        let submission = Submission {
            id: Uuid::new_v4().to_string(),
            quiz_id,
            student_id,
            answers: graded,
            score,
            total_questions: quiz.questions.len() as u32,
            submitted_at: Timestamp::new(self.clock.now_millis()),
        };

        // 4. 保存（確認と保存の間に別の提出が入った場合も AlreadySubmitted）
        self.submission_repository
            .save(submission.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists => SubmitQuizError::AlreadySubmitted,
                other => SubmitQuizError::Repository(other),
            })?;

        tracing::info!(
            "Student {} submitted quiz {}: {}/{}",
            student_id,
            quiz_id,
            submission.score,
            submission.total_questions
        );
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AnswerOption, ClassId, MockSubmissionRepository, ProfessorId, Question, Quiz,
    };
    use crate::infrastructure::repository::{
        InMemoryQuizRepository, InMemorySubmissionRepository,
    };
    use classpoll_shared::time::FixedClock;

    fn option(id: i64, is_correct: bool) -> AnswerOption {
        AnswerOption {
            id: OptionId::new(id).unwrap(),
            text: format!("option {}", id),
            is_correct,
        }
    }

    /// 設問 1（選択肢 11 が正解）、設問 2（選択肢 22 が正解）
    fn sample_quiz() -> Quiz {
        Quiz {
            id: QuizId::new(7).unwrap(),
            class_id: ClassId::new(3).unwrap(),
            professor_id: ProfessorId::new(2).unwrap(),
            title: "Cell Biology".to_string(),
            is_live_active: false,
            questions: vec![
                Question {
                    id: QuestionId::new(1).unwrap(),
                    text: "Q1".to_string(),
                    options: vec![option(11, true), option(12, false)],
                },
                Question {
                    id: QuestionId::new(2).unwrap(),
                    text: "Q2".to_string(),
                    options: vec![option(21, false), option(22, true)],
                },
            ],
        }
    }

    fn usecase() -> (SubmitQuizUseCase, Arc<InMemorySubmissionRepository>) {
        let submissions = Arc::new(InMemorySubmissionRepository::new());
        let usecase = SubmitQuizUseCase::new(
            Arc::new(InMemoryQuizRepository::with_quizzes(vec![sample_quiz()])),
            submissions.clone(),
            Arc::new(FixedClock::new(1_700_000_000_000)),
        );
        (usecase, submissions)
    }

    fn pair(question: i64, option: i64) -> (QuestionId, OptionId) {
        (
            QuestionId::new(question).unwrap(),
            OptionId::new(option).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_submission_is_scored_and_saved() {
        // テスト項目: 正解数がスコアになり、提出が保存される
        // given (前提条件):
        let (usecase, submissions) = usecase();

        // when (操作):
        let result = usecase
            .execute(
                QuizId::new(7).unwrap(),
                UserId::new(15).unwrap(),
                vec![pair(1, 11), pair(2, 21)],
            )
            .await;

        // then (期待する結果):
        let submission = result.unwrap();
        assert_eq!(submission.score, 1);
        assert_eq!(submission.total_questions, 2);
        assert_eq!(submission.submitted_at, Timestamp::new(1_700_000_000_000));
        assert!(submission.answers[0].is_correct);
        assert!(!submission.answers[1].is_correct);
        assert_eq!(submissions.count().await, 1);
    }

    #[tokio::test]
    async fn test_partial_submission_counts_all_questions() {
        // テスト項目: 未回答の設問があっても totalQuestions はクイズの設問数
        // given (前提条件):
        let (usecase, _) = usecase();

        // when (操作):
        let submission = usecase
            .execute(
                QuizId::new(7).unwrap(),
                UserId::new(15).unwrap(),
                vec![pair(2, 22)],
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(submission.score, 1);
        assert_eq!(submission.total_questions, 2);
    }

    #[tokio::test]
    async fn test_unknown_quiz_is_rejected() {
        // テスト項目: 存在しないクイズへの提出は QuizNotFound
        // given (前提条件):
        let (usecase, _) = usecase();

        // when (操作):
        let result = usecase
            .execute(QuizId::new(99).unwrap(), UserId::new(15).unwrap(), vec![])
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SubmitQuizError::QuizNotFound(QuizId::new(99).unwrap()))
        );
    }

    #[tokio::test]
    async fn test_invalid_answers_are_rejected() {
        // テスト項目: 他の設問の選択肢・存在しない設問・重複回答は拒否され、保存されない
        // given (前提条件):
        let (usecase, submissions) = usecase();
        let quiz_id = QuizId::new(7).unwrap();
        let student_id = UserId::new(15).unwrap();

        // when (操作):
        let wrong_option = usecase
            .execute(quiz_id, student_id, vec![pair(1, 22)])
            .await;
        let unknown_question = usecase
            .execute(quiz_id, student_id, vec![pair(5, 11)])
            .await;
        let duplicate = usecase
            .execute(quiz_id, student_id, vec![pair(1, 11), pair(1, 12)])
            .await;

        // then (期待する結果):
        assert_eq!(
            wrong_option,
            Err(SubmitQuizError::UnknownOption {
                question_id: QuestionId::new(1).unwrap(),
                option_id: OptionId::new(22).unwrap(),
            })
        );
        assert_eq!(
            unknown_question,
            Err(SubmitQuizError::UnknownQuestion(QuestionId::new(5).unwrap()))
        );
        assert_eq!(
            duplicate,
            Err(SubmitQuizError::DuplicateAnswer(QuestionId::new(1).unwrap()))
        );
        assert_eq!(submissions.count().await, 0);
    }

    #[tokio::test]
    async fn test_second_submission_is_rejected() {
        // テスト項目: 同じ学生・同じクイズの 2 回目の提出は AlreadySubmitted
        // given (前提条件):
        let (usecase, submissions) = usecase();
        let quiz_id = QuizId::new(7).unwrap();
        let student_id = UserId::new(15).unwrap();
        usecase
            .execute(quiz_id, student_id, vec![pair(1, 11)])
            .await
            .unwrap();

        // when (操作):
        let result = usecase
            .execute(quiz_id, student_id, vec![pair(1, 12)])
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SubmitQuizError::AlreadySubmitted));
        assert_eq!(submissions.count().await, 1);
    }

    #[tokio::test]
    async fn test_racing_save_maps_to_already_submitted() {
        // テスト項目: 確認後の保存で AlreadyExists が返った場合も AlreadySubmitted
        // given (前提条件):
        let mut store = MockSubmissionRepository::new();
        store.expect_find_by_student().returning(|_, _| Ok(None));
        store
            .expect_save()
            .times(1)
            .returning(|_| Err(RepositoryError::AlreadyExists));
        let usecase = SubmitQuizUseCase::new(
            Arc::new(InMemoryQuizRepository::with_quizzes(vec![sample_quiz()])),
            Arc::new(store),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作):
        let result = usecase
            .execute(
                QuizId::new(7).unwrap(),
                UserId::new(15).unwrap(),
                vec![pair(1, 11)],
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SubmitQuizError::AlreadySubmitted));
    }
}
