//! UseCase: ライブクイズの開始・停止（broadcast-then-confirm）
//!
//! ## プロトコル
//!
//! 1. `toggle` で `quiz_<id>` ルームに `live_quiz_activate` / `live_quiz_deactivate`
//!    を即座にブロードキャストし、状態を `BroadcastPending` にする
//! 2. 固定の遅延（既定 1000ms）の後、クイズの `isLiveActive` に確定書き込みを行う
//! 3. 成功すれば `Active` / `Inactive`、失敗すればログに残し `Diverged` にする。
//!    ブロードキャスト済みの状態はロールバックしない
//!
//! 確定タイマーはクイズ ID ごとに 1 つ。同じクイズへの新しい toggle は
//! 保留中の確定書き込みをキャンセルするため、最後に要求された状態だけが書き込まれる。
//! タイマーは発行元セッションの寿命とは無関係で、切断してもキャンセルされない。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ブロードキャストが同じ呼び出しの中で届くこと
//! - 確定書き込みが遅延より前に発行されないこと
//! - 連続した toggle では最後の状態だけが永続化されること
//! - 書き込み失敗時にロールバックしないこと
//! - シャットダウン時に保留中の確定書き込みが破棄されること

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use classpoll_shared::time::Clock;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::domain::{
    LiveQuizToggle, LiveState, MessagePusher, QuizId, QuizRepository, RoomName, RoomRepository,
    Timestamp,
};

use super::error::{RelayError, ToggleLiveError};

/// Delay between the optimistic broadcast and the confirmation write
pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_millis(1000);

struct PendingConfirmation {
    generation: u64,
    desired: bool,
    handle: JoinHandle<()>,
}

struct ToggleEntry {
    state: LiveState,
    pending: Option<PendingConfirmation>,
}

type ToggleTable = Arc<Mutex<HashMap<QuizId, ToggleEntry>>>;

/// ライブトグルの状態機械
pub struct LiveToggleUseCase {
    quiz_repository: Arc<dyn QuizRepository>,
    room_repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    confirm_delay: Duration,
    entries: ToggleTable,
    next_generation: AtomicU64,
}

impl LiveToggleUseCase {
    pub fn new(
        quiz_repository: Arc<dyn QuizRepository>,
        room_repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        confirm_delay: Duration,
    ) -> Self {
        Self {
            quiz_repository,
            room_repository,
            message_pusher,
            clock,
            confirm_delay,
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn confirm_delay(&self) -> Duration {
        self.confirm_delay
    }

    /// Build the toggle event for a professor action issued over HTTP.
    ///
    /// Loads the quiz to fill in its title and class.
    pub async fn prepare(
        &self,
        quiz_id: QuizId,
        professor_name: String,
    ) -> Result<LiveQuizToggle, ToggleLiveError> {
        let quiz = self
            .quiz_repository
            .find_quiz(quiz_id)
            .await
            .map_err(ToggleLiveError::Repository)?
            .ok_or(ToggleLiveError::QuizNotFound(quiz_id))?;

        Ok(LiveQuizToggle {
            quiz_id,
            quiz_title: quiz.title,
            class_id: quiz.class_id,
            professor_name,
            timestamp: Timestamp::new(self.clock.now_millis()),
        })
    }

    /// Broadcast the toggle to `quiz_<id>` and schedule the confirmation write.
    ///
    /// # Arguments
    ///
    /// * `toggle` - The toggle event (Domain Model)
    /// * `is_live_active` - Desired value of `isLiveActive`
    /// * `content` - Serialized frame to broadcast (built by the DTO layer)
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of sessions the broadcast was handed to
    /// * `Err(RelayError)` - The transport is not running; nothing was scheduled
    pub async fn toggle(
        &self,
        toggle: &LiveQuizToggle,
        is_live_active: bool,
        content: &str,
    ) -> Result<usize, RelayError> {
        let quiz_id = toggle.quiz_id;

        // Held across broadcast and scheduling: toggles for one quiz reach clients
        // in the order their confirmations are superseded.
        let mut entries = self.entries.lock().await;

        // 1. Optimistic broadcast
        let targets = self.room_repository.members(&RoomName::Quiz(quiz_id)).await;
        let delivered = self.message_pusher.broadcast(&targets, content).await?;
        tracing::info!(
            "Quiz {} live toggle ({}) broadcast to {} session(s)",
            quiz_id,
            if is_live_active { "activate" } else { "deactivate" },
            delivered
        );

        // 2. Schedule the confirmation write, superseding any pending one
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = entries.entry(quiz_id).or_insert(ToggleEntry {
            state: LiveState::Inactive,
            pending: None,
        });
        if let Some(previous) = entry.pending.take() {
            previous.handle.abort();
            tracing::debug!(
                "Quiz {} pending confirmation (isLiveActive = {}) superseded",
                quiz_id,
                previous.desired
            );
        }
        entry.state = LiveState::BroadcastPending {
            desired: is_live_active,
        };

        let handle = tokio::spawn(confirm_after_delay(
            self.quiz_repository.clone(),
            self.entries.clone(),
            quiz_id,
            is_live_active,
            generation,
            self.confirm_delay,
        ));
        entry.pending = Some(PendingConfirmation {
            generation,
            desired: is_live_active,
            handle,
        });

        Ok(delivered)
    }

    /// Current protocol state, or `None` if the quiz was never toggled by this process.
    pub async fn state(&self, quiz_id: QuizId) -> Option<LiveState> {
        let entries = self.entries.lock().await;
        entries.get(&quiz_id).map(|entry| entry.state)
    }

    pub async fn pending_count(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|e| e.pending.is_some()).count()
    }

    /// Cancel every pending confirmation. Their writes are lost.
    ///
    /// Returns the quizzes whose confirmation was dropped.
    pub async fn drain(&self) -> Vec<QuizId> {
        let mut entries = self.entries.lock().await;
        let mut lost = Vec::new();
        for (quiz_id, entry) in entries.iter_mut() {
            if let Some(pending) = entry.pending.take() {
                pending.handle.abort();
                tracing::warn!(
                    "Confirmation for quiz {} (isLiveActive = {}) dropped on shutdown",
                    quiz_id,
                    pending.desired
                );
                lost.push(*quiz_id);
            }
        }
        lost.sort();
        lost
    }
}

async fn confirm_after_delay(
    quiz_repository: Arc<dyn QuizRepository>,
    entries: ToggleTable,
    quiz_id: QuizId,
    is_live_active: bool,
    generation: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    let result = quiz_repository
        .set_live_active(quiz_id, is_live_active)
        .await;

    let mut entries = entries.lock().await;
    let Some(entry) = entries.get_mut(&quiz_id) else {
        return;
    };
    let is_current = entry
        .pending
        .as_ref()
        .is_some_and(|pending| pending.generation == generation);

    match result {
        Ok(()) => {
            tracing::info!(
                "Quiz {} isLiveActive = {} confirmed",
                quiz_id,
                is_live_active
            );
            if is_current {
                entry.state = LiveState::confirmed(is_live_active);
                entry.pending = None;
            }
        }
        Err(e) => {
            tracing::error!(
                "Failed to confirm quiz {} isLiveActive = {}: {}",
                quiz_id,
                is_live_active,
                e
            );
            if is_current {
                entry.state = LiveState::Diverged {
                    broadcast: is_live_active,
                };
                entry.pending = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ClassId, MockQuizRepository, ProfessorId, Quiz, RepositoryError, SessionId,
        SessionIdFactory,
    };
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryQuizRepository, InMemoryRoomRepository},
    };
    use classpoll_shared::time::FixedClock;
    use mockall::predicate::eq;
    use tokio::sync::mpsc;

    struct Fixture {
        usecase: LiveToggleUseCase,
        rooms: Arc<InMemoryRoomRepository>,
        pusher: Arc<WebSocketMessagePusher>,
    }

    fn quiz(id: i64) -> Quiz {
        Quiz {
            id: QuizId::new(id).unwrap(),
            class_id: ClassId::new(3).unwrap(),
            professor_id: ProfessorId::new(5).unwrap(),
            title: "Borrowing".to_string(),
            is_live_active: false,
            questions: vec![],
        }
    }

    fn toggle_event(id: i64) -> LiveQuizToggle {
        LiveQuizToggle {
            quiz_id: QuizId::new(id).unwrap(),
            quiz_title: "Borrowing".to_string(),
            class_id: ClassId::new(3).unwrap(),
            professor_name: "Dr. Sato".to_string(),
            timestamp: Timestamp::new(1000),
        }
    }

    async fn fixture(quiz_repository: Arc<dyn QuizRepository>) -> Fixture {
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        pusher.start().await;
        let usecase = LiveToggleUseCase::new(
            quiz_repository,
            rooms.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(1_700_000_000_000)),
            DEFAULT_CONFIRM_DELAY,
        );
        Fixture {
            usecase,
            rooms,
            pusher,
        }
    }

    async fn join_quiz(
        fixture: &Fixture,
        quiz_id: i64,
    ) -> (SessionId, mpsc::UnboundedReceiver<String>) {
        let session = SessionIdFactory::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        fixture
            .pusher
            .register_session(session.clone(), tx)
            .await
            .unwrap();
        fixture
            .rooms
            .join(&session, RoomName::Quiz(QuizId::new(quiz_id).unwrap()))
            .await;
        (session, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_activate_broadcasts_now_and_confirms_after_delay() {
        // テスト項目: クイズ 42 を開始すると即座にブロードキャストされ、1000ms 後に永続化される
        // given (前提条件):
        let store = Arc::new(InMemoryQuizRepository::with_quizzes(vec![quiz(42)]));
        let fixture = fixture(store.clone()).await;
        let (_professor, mut professor_rx) = join_quiz(&fixture, 42).await;
        let (_student, mut student_rx) = join_quiz(&fixture, 42).await;
        let quiz_id = QuizId::new(42).unwrap();

        // when (操作):
        let delivered = fixture
            .usecase
            .toggle(&toggle_event(42), true, "activate")
            .await
            .unwrap();

        // then (期待する結果): ブロードキャストは同じ呼び出しの中で届いている
        assert_eq!(delivered, 2);
        assert_eq!(professor_rx.try_recv().unwrap(), "activate");
        assert_eq!(student_rx.try_recv().unwrap(), "activate");
        assert_eq!(
            fixture.usecase.state(quiz_id).await,
            Some(LiveState::BroadcastPending { desired: true })
        );

        // 遅延より前には書き込まれない
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(!store.find_quiz(quiz_id).await.unwrap().unwrap().is_live_active);

        // 遅延後に書き込まれる
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(store.find_quiz(quiz_id).await.unwrap().unwrap().is_live_active);
        assert_eq!(fixture.usecase.state(quiz_id).await, Some(LiveState::Active));
        assert_eq!(fixture.usecase.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_toggle_persists_only_final_state() {
        // テスト項目: 遅延内に開始→停止すると、最後の状態だけが書き込まれ、両方のイベントは順に届く
        // given (前提条件):
        let mut store = MockQuizRepository::new();
        store
            .expect_set_live_active()
            .with(eq(QuizId::new(42).unwrap()), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));
        let fixture = fixture(Arc::new(store)).await;
        let (_professor, mut rx) = join_quiz(&fixture, 42).await;
        let quiz_id = QuizId::new(42).unwrap();

        // when (操作):
        fixture
            .usecase
            .toggle(&toggle_event(42), true, "activate")
            .await
            .unwrap();
        fixture
            .usecase
            .toggle(&toggle_event(42), false, "deactivate")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // then (期待する結果):
        assert_eq!(rx.try_recv().unwrap(), "activate");
        assert_eq!(rx.try_recv().unwrap(), "deactivate");
        assert_eq!(
            fixture.usecase.state(quiz_id).await,
            Some(LiveState::Inactive)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_failure_does_not_roll_back_broadcast() {
        // テスト項目: 確定書き込みが失敗しても、ブロードキャストは取り消されず Diverged になる
        // given (前提条件):
        let mut store = MockQuizRepository::new();
        store
            .expect_set_live_active()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Unavailable("connection refused".into())));
        let fixture = fixture(Arc::new(store)).await;
        let (_professor, mut rx) = join_quiz(&fixture, 7).await;
        let quiz_id = QuizId::new(7).unwrap();

        // when (操作):
        fixture
            .usecase
            .toggle(&toggle_event(7), true, "activate")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // then (期待する結果):
        assert_eq!(rx.try_recv().unwrap(), "activate");
        assert!(rx.try_recv().is_err());
        assert_eq!(
            fixture.usecase.state(quiz_id).await,
            Some(LiveState::Diverged { broadcast: true })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_survives_issuer_disconnect() {
        // テスト項目: 発行元セッションが切断しても確定書き込みは行われる
        // given (前提条件):
        let store = Arc::new(InMemoryQuizRepository::with_quizzes(vec![quiz(42)]));
        let fixture = fixture(store.clone()).await;
        let (professor, _rx) = join_quiz(&fixture, 42).await;
        let quiz_id = QuizId::new(42).unwrap();
        fixture
            .usecase
            .toggle(&toggle_event(42), true, "activate")
            .await
            .unwrap();

        // when (操作):
        fixture.rooms.leave_all(&professor).await;
        fixture.pusher.unregister_session(&professor).await;
        tokio::time::sleep(Duration::from_millis(1001)).await;

        // then (期待する結果):
        assert!(store.find_quiz(quiz_id).await.unwrap().unwrap().is_live_active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_drops_pending_confirmations() {
        // テスト項目: シャットダウン時に保留中の確定書き込みは破棄される
        // given (前提条件):
        let store = Arc::new(InMemoryQuizRepository::with_quizzes(vec![quiz(42)]));
        let fixture = fixture(store.clone()).await;
        let quiz_id = QuizId::new(42).unwrap();
        fixture
            .usecase
            .toggle(&toggle_event(42), true, "activate")
            .await
            .unwrap();

        // when (操作):
        let lost = fixture.usecase.drain().await;
        tokio::time::sleep(Duration::from_millis(2000)).await;

        // then (期待する結果):
        assert_eq!(lost, vec![quiz_id]);
        assert!(!store.find_quiz(quiz_id).await.unwrap().unwrap().is_live_active);
        assert_eq!(fixture.usecase.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_toggle_before_transport_start_fails() {
        // テスト項目: トランスポート開始前の toggle は TransportNotStarted で何も予約しない
        // given (前提条件):
        let usecase = LiveToggleUseCase::new(
            Arc::new(MockQuizRepository::new()),
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(FixedClock::new(0)),
            DEFAULT_CONFIRM_DELAY,
        );

        // when (操作):
        let result = usecase.toggle(&toggle_event(1), true, "activate").await;

        // then (期待する結果):
        assert_eq!(result, Err(RelayError::TransportNotStarted));
        assert_eq!(usecase.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_prepare_fills_quiz_metadata() {
        // テスト項目: prepare はクイズのタイトルとクラスを埋め、時計の時刻を使う
        // given (前提条件):
        let store = Arc::new(InMemoryQuizRepository::with_quizzes(vec![quiz(42)]));
        let fixture = fixture(store).await;

        // when (操作):
        let toggle = fixture
            .usecase
            .prepare(QuizId::new(42).unwrap(), "Dr. Sato".to_string())
            .await
            .unwrap();
        let missing = fixture
            .usecase
            .prepare(QuizId::new(43).unwrap(), "Dr. Sato".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(toggle.quiz_title, "Borrowing");
        assert_eq!(toggle.class_id, ClassId::new(3).unwrap());
        assert_eq!(toggle.timestamp, Timestamp::new(1_700_000_000_000));
        assert_eq!(
            missing,
            Err(ToggleLiveError::QuizNotFound(QuizId::new(43).unwrap()))
        );
    }
}
