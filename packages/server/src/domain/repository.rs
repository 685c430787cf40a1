//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{Quiz, QuizId, RepositoryError, RoomName, SessionId, Submission, UserId};

/// Room Registry
///
/// ルーム名からセッション集合へのメンバーシップを管理する。
/// ルームは最初の join で生成され、最後のメンバーが抜けると消える。
/// 存在しないクイズやユーザーのルームへの join は検証しない。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// セッションをルームに追加（冪等）。新規に追加された場合は `true`
    async fn join(&self, session_id: &SessionId, room: RoomName) -> bool;

    /// セッションを 1 つのルームから削除。メンバーだった場合は `true`
    async fn leave(&self, session_id: &SessionId, room: &RoomName) -> bool;

    /// セッションを全てのルームから削除し、所属していたルームを返す
    async fn leave_all(&self, session_id: &SessionId) -> Vec<RoomName>;

    /// ルームのメンバー（join 順）
    async fn members(&self, room: &RoomName) -> Vec<SessionId>;

    /// セッションが所属しているルーム
    async fn rooms_of(&self, session_id: &SessionId) -> Vec<RoomName>;

    /// ルーム名とメンバー数のスナップショット
    async fn snapshot(&self) -> BTreeMap<String, usize>;

    /// 全てのメンバーシップを破棄（シャットダウン時）
    async fn clear(&self);
}

/// Quiz Repository
///
/// 周辺の CRUD アプリケーションが所有するクイズレコードへのアクセス。
/// `set_live_active` は冪等な書き込みとして扱う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn find_quiz(&self, quiz_id: QuizId) -> Result<Option<Quiz>, RepositoryError>;

    async fn set_live_active(
        &self,
        quiz_id: QuizId,
        is_live_active: bool,
    ) -> Result<(), RepositoryError>;
}

/// Submission Repository
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn find_by_student(
        &self,
        quiz_id: QuizId,
        student_id: UserId,
    ) -> Result<Option<Submission>, RepositoryError>;

    /// 同じ学生・クイズの提出が既にある場合は `RepositoryError::AlreadyExists`
    async fn save(&self, submission: Submission) -> Result<(), RepositoryError>;
}
