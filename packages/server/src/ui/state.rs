//! Server state shared by every handler.

use std::sync::Arc;

use crate::usecase::{GetQuizUseCase, LiveToggleUseCase, RelayDispatcher, SubmitQuizUseCase};

/// Shared application state
pub struct AppState {
    /// RelayDispatcher（WebSocket イベントの中継）
    pub relay: Arc<RelayDispatcher>,
    /// LiveToggleUseCase（HTTP からのライブ開始・停止）
    pub live_toggle: Arc<LiveToggleUseCase>,
    /// GetQuizUseCase（クイズとライブ状態の取得）
    pub get_quiz: Arc<GetQuizUseCase>,
    /// SubmitQuizUseCase（最終提出）
    pub submit_quiz: Arc<SubmitQuizUseCase>,
}
