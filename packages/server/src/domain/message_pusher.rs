//! MessagePusher trait 定義
//!
//! セッションへのメッセージ送信（通知）のインターフェース。
//! WebSocket などの具体的なトランスポートは Infrastructure 層が実装します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessagePushError, SessionId};

/// セッションへの送信チャンネル（シリアライズ済みの JSON を流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Realtime transport abstraction.
///
/// The transport must be started before any session can be registered.
/// Using it before `start` (or after `drain`) yields
/// `MessagePushError::TransportNotStarted`.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Begin accepting sessions
    async fn start(&self);

    /// Whether `start` has been called and `drain` has not
    async fn is_running(&self) -> bool;

    /// Stop accepting sessions and drop every outbound channel.
    /// Returns the number of sessions that were dropped.
    async fn drain(&self) -> usize;

    async fn register_session(
        &self,
        session_id: SessionId,
        sender: PusherChannel,
    ) -> Result<(), MessagePushError>;

    async fn unregister_session(&self, session_id: &SessionId);

    async fn push_to(&self, session_id: &SessionId, content: &str)
    -> Result<(), MessagePushError>;

    /// Push `content` to every target. Missing or closed sessions are skipped.
    /// Returns the number of sessions the message was handed to.
    async fn broadcast(
        &self,
        targets: &[SessionId],
        content: &str,
    ) -> Result<usize, MessagePushError>;
}
