//! Entities
//!
//! ライブ中継で流れる一時的なイベントと、周辺アプリケーションが所有する
//! クイズ・提出物のエンティティを定義します。

use serde::Serialize;

use super::value_object::{
    ClassId, OptionId, ProfessorId, QuestionId, QuizId, Timestamp, UserId,
};

/// A student's in-progress answer selection.
///
/// Never stored; it only lives for the duration of one fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveAnswer {
    pub student_id: UserId,
    pub student_name: String,
    pub quiz_id: QuizId,
    pub question_id: QuestionId,
    pub selected_option_id: OptionId,
    pub option_text: String,
    pub timestamp: Timestamp,
    /// Extra fan-out target when the client addresses a professor directly.
    pub professor_id: Option<ProfessorId>,
}

/// Payload of `live_quiz_activate` / `live_quiz_deactivate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveQuizToggle {
    pub quiz_id: QuizId,
    pub quiz_title: String,
    pub class_id: ClassId,
    pub professor_name: String,
    pub timestamp: Timestamp,
}

/// Per-quiz position in the broadcast-then-confirm protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum LiveState {
    Inactive,
    /// Broadcast has gone out; the confirmation write is scheduled.
    #[serde(rename_all = "camelCase")]
    BroadcastPending { desired: bool },
    Active,
    /// The confirmation write failed. Clients saw `broadcast`, the store did not change.
    #[serde(rename_all = "camelCase")]
    Diverged { broadcast: bool },
}

impl LiveState {
    /// State reached once the confirmation write for `is_live_active` succeeded.
    pub fn confirmed(is_live_active: bool) -> Self {
        if is_live_active {
            LiveState::Active
        } else {
            LiveState::Inactive
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn find_option(&self, option_id: OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub id: QuizId,
    pub class_id: ClassId,
    pub professor_id: ProfessorId,
    pub title: String,
    pub is_live_active: bool,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn find_question(&self, question_id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

/// One graded answer of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub selected_option_id: OptionId,
    pub is_correct: bool,
}

/// Final answer set of one student for one quiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: String,
    pub quiz_id: QuizId,
    pub student_id: UserId,
    pub answers: Vec<SubmittedAnswer>,
    pub score: u32,
    pub total_questions: u32,
    pub submitted_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quiz() -> Quiz {
        Quiz {
            id: QuizId::new(7).unwrap(),
            class_id: ClassId::new(1).unwrap(),
            professor_id: ProfessorId::new(2).unwrap(),
            title: "Ownership".to_string(),
            is_live_active: false,
            questions: vec![Question {
                id: QuestionId::new(3).unwrap(),
                text: "Who owns a moved value?".to_string(),
                options: vec![
                    AnswerOption {
                        id: OptionId::new(9).unwrap(),
                        text: "The new binding".to_string(),
                        is_correct: true,
                    },
                    AnswerOption {
                        id: OptionId::new(10).unwrap(),
                        text: "Both".to_string(),
                        is_correct: false,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_find_question_and_option() {
        // テスト項目: クイズから設問と選択肢を検索できる
        // given (前提条件):
        let quiz = sample_quiz();

        // when (操作):
        let question = quiz.find_question(QuestionId::new(3).unwrap());
        let missing = quiz.find_question(QuestionId::new(4).unwrap());

        // then (期待する結果):
        let question = question.unwrap();
        assert!(missing.is_none());
        assert!(question.find_option(OptionId::new(9).unwrap()).unwrap().is_correct);
        assert!(question.find_option(OptionId::new(11).unwrap()).is_none());
    }

    #[test]
    fn test_live_state_confirmed() {
        // テスト項目: 確定後の状態が要求値に応じて決まる
        // given (前提条件):

        // when (操作):
        let on = LiveState::confirmed(true);
        let off = LiveState::confirmed(false);

        // then (期待する結果):
        assert_eq!(on, LiveState::Active);
        assert_eq!(off, LiveState::Inactive);
    }

    #[test]
    fn test_live_state_serialization() {
        // テスト項目: LiveState が phase タグ付きの JSON に変換される
        // given (前提条件):
        let pending = LiveState::BroadcastPending { desired: true };

        // when (操作):
        let json = serde_json::to_value(pending).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({"phase": "broadcastPending", "desired": true})
        );
    }
}
