//! UseCase: ライブ中継のディスパッチ
//!
//! クライアントから届いたイベントを対象ルームのセッションへ再送します。
//! DB には一切書き込みません（ライブトグルの確定書き込みは `LiveToggleUseCase` が担当）。
//!
//! ## 配信保証
//!
//! - at-most-once。再接続前に失われたイベントは再送しない
//! - 1 つのセッションから届いたイベントは受信順に処理される
//! - セッションをまたいだ順序保証はない
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - join した全セッションにちょうど 1 通ずつ届くこと（教員ルームとの重複排除を含む）
//! - 後から join したセッションには過去のイベントが届かないこと
//! - 切断したセッションには以後のイベントが届かないこと
//! - ライブ回答の中継で DB アクセスが発生しないこと

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use crate::domain::{
    LiveAnswer, LiveQuizToggle, MessagePusher, ProfessorId, PusherChannel, QuizId, RoomName,
    RoomRepository, SessionId, UserId,
};

use super::{error::RelayError, live_toggle::LiveToggleUseCase};

/// What was released on shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub dropped_sessions: usize,
    pub lost_confirmations: Vec<QuizId>,
}

/// ライブ中継のディスパッチャ
pub struct RelayDispatcher {
    room_repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    live_toggle: Arc<LiveToggleUseCase>,
}

impl RelayDispatcher {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        live_toggle: Arc<LiveToggleUseCase>,
    ) -> Self {
        Self {
            room_repository,
            message_pusher,
            live_toggle,
        }
    }

    /// Start the realtime transport. Must run before the listener accepts.
    pub async fn start(&self) {
        self.message_pusher.start().await;
    }

    pub async fn ensure_started(&self) -> Result<(), RelayError> {
        if self.message_pusher.is_running().await {
            Ok(())
        } else {
            Err(RelayError::TransportNotStarted)
        }
    }

    /// Register the outbound channel of a new session
    pub async fn on_connect(
        &self,
        session_id: SessionId,
        sender: PusherChannel,
    ) -> Result<(), RelayError> {
        self.message_pusher
            .register_session(session_id, sender)
            .await?;
        Ok(())
    }

    /// Push a frame to one session (greetings and join acknowledgements)
    pub async fn notify_session(
        &self,
        session_id: &SessionId,
        content: &str,
    ) -> Result<(), RelayError> {
        self.message_pusher.push_to(session_id, content).await?;
        Ok(())
    }

    pub async fn on_join_user_room(&self, session_id: &SessionId, user_id: UserId) -> RoomName {
        self.join(session_id, RoomName::User(user_id)).await
    }

    pub async fn on_join_quiz_room(&self, session_id: &SessionId, quiz_id: QuizId) -> RoomName {
        self.join(session_id, RoomName::Quiz(quiz_id)).await
    }

    pub async fn on_join_professor_room(
        &self,
        session_id: &SessionId,
        professor_id: ProfessorId,
    ) -> RoomName {
        self.join(session_id, RoomName::Professor(professor_id))
            .await
    }

    async fn join(&self, session_id: &SessionId, room: RoomName) -> RoomName {
        if self.room_repository.join(session_id, room).await {
            tracing::info!("Session '{}' joined '{}'", session_id, room);
        } else {
            tracing::debug!("Session '{}' already in '{}'", session_id, room);
        }
        room
    }

    /// Fan a live answer out to `quiz_<quizId>` (and `professor_<id>` when addressed).
    ///
    /// # Arguments
    ///
    /// * `session_id` - Sending session
    /// * `answer` - Validated answer (Domain Model)
    /// * `content` - Frame to forward unchanged (built by the DTO layer)
    ///
    /// # Returns
    ///
    /// Number of sessions the frame was handed to
    pub async fn on_live_answer_update(
        &self,
        session_id: &SessionId,
        answer: &LiveAnswer,
        content: &str,
    ) -> Result<usize, RelayError> {
        let mut groups = vec![
            self.room_repository
                .members(&RoomName::Quiz(answer.quiz_id))
                .await,
        ];
        if let Some(professor_id) = answer.professor_id {
            groups.push(
                self.room_repository
                    .members(&RoomName::Professor(professor_id))
                    .await,
            );
        }
        let targets = fan_out_targets(groups);

        let delivered = self.message_pusher.broadcast(&targets, content).await?;
        tracing::debug!(
            "Relayed answer of student {} (quiz {}, question {}) from '{}' to {} session(s)",
            answer.student_id,
            answer.quiz_id,
            answer.question_id,
            session_id,
            delivered
        );
        Ok(delivered)
    }

    /// Relay a professor's live toggle and hand it to the confirmation state machine.
    pub async fn on_live_quiz_toggle(
        &self,
        session_id: &SessionId,
        toggle: &LiveQuizToggle,
        is_live_active: bool,
        content: &str,
    ) -> Result<usize, RelayError> {
        tracing::info!(
            "Session '{}' toggles quiz {} live = {}",
            session_id,
            toggle.quiz_id,
            is_live_active
        );
        self.live_toggle
            .toggle(toggle, is_live_active, content)
            .await
    }

    /// Remove the session from every room and drop its outbound channel.
    pub async fn on_disconnect(&self, session_id: &SessionId) -> Vec<RoomName> {
        let rooms = self.room_repository.leave_all(session_id).await;
        self.message_pusher.unregister_session(session_id).await;
        tracing::info!(
            "Session '{}' disconnected, removed from {} room(s)",
            session_id,
            rooms.len()
        );
        rooms
    }

    pub async fn room_snapshot(&self) -> BTreeMap<String, usize> {
        self.room_repository.snapshot().await
    }

    /// Tear down process-wide relay state.
    pub async fn shutdown(&self) -> ShutdownReport {
        let lost_confirmations = self.live_toggle.drain().await;
        let dropped_sessions = self.message_pusher.drain().await;
        self.room_repository.clear().await;
        ShutdownReport {
            dropped_sessions,
            lost_confirmations,
        }
    }
}

/// Flatten room member lists into one target list.
///
/// A session present in several rooms appears once, at its first position.
fn fan_out_targets(groups: Vec<Vec<SessionId>>) -> Vec<SessionId> {
    let mut seen = HashSet::new();
    groups
        .into_iter()
        .flatten()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
