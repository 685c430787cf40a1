//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - セッションごとの `UnboundedSender` を管理
//! - セッションへのメッセージ送信（push_to, broadcast）
//! - トランスポートのライフサイクル（start / drain）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! sender を drop すると UI 層の送信ループが終了し、ソケットが閉じられます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, PusherChannel, SessionId};

#[derive(Default)]
struct Transport {
    running: bool,
    sessions: HashMap<SessionId, PusherChannel>,
}

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.start().await;
/// pusher.register_session(session_id.clone(), tx).await?;
/// pusher.push_to(&session_id, "{\"event\":\"connected\"}").await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    transport: Mutex<Transport>,
}

impl WebSocketMessagePusher {
    /// 停止状態の WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.transport.lock().await.sessions.len()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn start(&self) {
        let mut transport = self.transport.lock().await;
        transport.running = true;
        tracing::debug!("WebSocket transport started");
    }

    async fn is_running(&self) -> bool {
        self.transport.lock().await.running
    }

    async fn drain(&self) -> usize {
        let mut transport = self.transport.lock().await;
        transport.running = false;
        let dropped = transport.sessions.len();
        transport.sessions.clear();
        tracing::debug!("WebSocket transport drained ({} session(s))", dropped);
        dropped
    }

    async fn register_session(
        &self,
        session_id: SessionId,
        sender: PusherChannel,
    ) -> Result<(), MessagePushError> {
        let mut transport = self.transport.lock().await;
        if !transport.running {
            return Err(MessagePushError::TransportNotStarted);
        }
        tracing::debug!("Session '{}' registered to MessagePusher", session_id);
        transport.sessions.insert(session_id, sender);
        Ok(())
    }

    async fn unregister_session(&self, session_id: &SessionId) {
        let mut transport = self.transport.lock().await;
        transport.sessions.remove(session_id);
        tracing::debug!("Session '{}' unregistered from MessagePusher", session_id);
    }

    async fn push_to(
        &self,
        session_id: &SessionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let transport = self.transport.lock().await;
        if !transport.running {
            return Err(MessagePushError::TransportNotStarted);
        }

        let sender = transport
            .sessions
            .get(session_id)
            .ok_or_else(|| MessagePushError::SessionNotFound(session_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to session '{}'", session_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[SessionId],
        content: &str,
    ) -> Result<usize, MessagePushError> {
        let transport = self.transport.lock().await;
        if !transport.running {
            return Err(MessagePushError::TransportNotStarted);
        }

        let mut delivered = 0;
        for target in targets {
            match transport.sessions.get(target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(content.to_string()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!("Failed to push message to session '{}': {}", target, e)
                    }
                },
                None => {
                    tracing::warn!("Session '{}' not found during broadcast, skipping", target)
                }
            }
        }

        Ok(delivered)
    }
}
