//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! ルーム → セッション と セッション → ルーム の 2 つの HashMap を
//! 同じロックの下で更新し、切断時の全ルーム離脱を O(所属ルーム数) で行います。
//!
//! 単一プロセス前提です。複数インスタンス間でのメンバーシップ同期は行いません。

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RoomName, RoomRepository, SessionId};

#[derive(Default)]
struct Membership {
    /// Members per room, in join order
    rooms: HashMap<RoomName, Vec<SessionId>>,
    /// Reverse index used on disconnect
    sessions: HashMap<SessionId, HashSet<RoomName>>,
}

/// インメモリ Room Registry
#[derive(Default)]
pub struct InMemoryRoomRepository {
    membership: Mutex<Membership>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join(&self, session_id: &SessionId, room: RoomName) -> bool {
        let mut guard = self.membership.lock().await;
        let membership = &mut *guard;

        let members = membership.rooms.entry(room).or_default();
        if members.contains(session_id) {
            return false;
        }
        members.push(session_id.clone());
        membership
            .sessions
            .entry(session_id.clone())
            .or_default()
            .insert(room);

        tracing::debug!("Session '{}' joined room '{}'", session_id, room);
        true
    }

    async fn leave(&self, session_id: &SessionId, room: &RoomName) -> bool {
        let mut guard = self.membership.lock().await;
        let membership = &mut *guard;

        let removed = match membership.rooms.get_mut(room) {
            Some(members) => {
                let before = members.len();
                members.retain(|id| id != session_id);
                let removed = members.len() != before;
                if members.is_empty() {
                    membership.rooms.remove(room);
                }
                removed
            }
            None => false,
        };

        if let Some(rooms) = membership.sessions.get_mut(session_id) {
            rooms.remove(room);
            if rooms.is_empty() {
                membership.sessions.remove(session_id);
            }
        }

        removed
    }

    async fn leave_all(&self, session_id: &SessionId) -> Vec<RoomName> {
        let mut guard = self.membership.lock().await;
        let membership = &mut *guard;

        let Some(rooms) = membership.sessions.remove(session_id) else {
            return Vec::new();
        };

        let mut left: Vec<RoomName> = rooms.into_iter().collect();
        left.sort();
        for room in &left {
            if let Some(members) = membership.rooms.get_mut(room) {
                members.retain(|id| id != session_id);
                if members.is_empty() {
                    membership.rooms.remove(room);
                }
            }
        }

        tracing::debug!("Session '{}' left {} room(s)", session_id, left.len());
        left
    }

    async fn members(&self, room: &RoomName) -> Vec<SessionId> {
        let membership = self.membership.lock().await;
        membership.rooms.get(room).cloned().unwrap_or_default()
    }

    async fn rooms_of(&self, session_id: &SessionId) -> Vec<RoomName> {
        let membership = self.membership.lock().await;
        let mut rooms: Vec<RoomName> = membership
            .sessions
            .get(session_id)
            .map(|rooms| rooms.iter().copied().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    async fn snapshot(&self) -> BTreeMap<String, usize> {
        let membership = self.membership.lock().await;
        membership
            .rooms
            .iter()
            .map(|(room, members)| (room.to_string(), members.len()))
            .collect()
    }

    async fn clear(&self) {
        let mut guard = self.membership.lock().await;
        let membership = &mut *guard;
        membership.rooms.clear();
        membership.sessions.clear();
    }
}
