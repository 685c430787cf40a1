//! WebSocket message DTOs.
//!
//! Every frame is a JSON text envelope `{"event": <name>, "data": <payload>}`.
//! Ids are accepted as JSON numbers or numeric strings, timestamps as
//! Unix milliseconds or RFC 3339 strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recognized event names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventName {
    JoinUserRoom,
    JoinQuizRoom,
    JoinProfessorRoom,
    LiveAnswerUpdate,
    LiveQuizActivate,
    LiveQuizDeactivate,
    Connected,
    RoomJoined,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::JoinUserRoom => "join_user_room",
            EventName::JoinQuizRoom => "join_quiz_room",
            EventName::JoinProfessorRoom => "join_professor_room",
            EventName::LiveAnswerUpdate => "live_answer_update",
            EventName::LiveQuizActivate => "live_quiz_activate",
            EventName::LiveQuizDeactivate => "live_quiz_deactivate",
            EventName::Connected => "connected",
            EventName::RoomJoined => "room_joined",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let event = match name {
            "join_user_room" => EventName::JoinUserRoom,
            "join_quiz_room" => EventName::JoinQuizRoom,
            "join_professor_room" => EventName::JoinProfessorRoom,
            "live_answer_update" => EventName::LiveAnswerUpdate,
            "live_quiz_activate" => EventName::LiveQuizActivate,
            "live_quiz_deactivate" => EventName::LiveQuizDeactivate,
            "connected" => EventName::Connected,
            "room_joined" => EventName::RoomJoined,
            _ => return None,
        };
        Some(event)
    }

    /// Toggle event for the desired live state
    pub fn live_toggle(is_live_active: bool) -> Self {
        if is_live_active {
            EventName::LiveQuizActivate
        } else {
            EventName::LiveQuizDeactivate
        }
    }
}

/// Frame envelope shared by both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(event: EventName, data: Value) -> Self {
        Self {
            event: event.as_str().to_string(),
            data,
        }
    }
}

/// Identifier as sent by browsers: number or numeric string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

/// Timestamp as sent by browsers: `Date.now()` or `toISOString()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(i64),
    Text(String),
}

/// `live_answer_update` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveAnswerUpdatePayload {
    pub student_id: WireId,
    pub student_name: String,
    pub quiz_id: WireId,
    pub question_id: WireId,
    pub selected_option_id: WireId,
    pub option_text: String,
    pub timestamp: WireTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor_id: Option<WireId>,
}

/// `live_quiz_activate` / `live_quiz_deactivate` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveQuizTogglePayload {
    pub quiz_id: WireId,
    pub quiz_title: String,
    pub class_id: WireId,
    pub professor_name: String,
    pub timestamp: WireTimestamp,
}

/// `connected` payload (server → client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub session_id: String,
}

/// `room_joined` payload (server → client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoinedPayload {
    pub room: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_round_trip_for_every_variant() {
        // テスト項目: 全てのイベント名が文字列と相互変換できる
        // given (前提条件):
        let names = [
            EventName::JoinUserRoom,
            EventName::JoinQuizRoom,
            EventName::JoinProfessorRoom,
            EventName::LiveAnswerUpdate,
            EventName::LiveQuizActivate,
            EventName::LiveQuizDeactivate,
            EventName::Connected,
            EventName::RoomJoined,
        ];

        // when (操作):
        let parsed: Vec<Option<EventName>> =
            names.iter().map(|n| EventName::parse(n.as_str())).collect();

        // then (期待する結果):
        assert_eq!(parsed, names.iter().copied().map(Some).collect::<Vec<_>>());
        assert_eq!(EventName::parse("disconnect"), None);
    }

    #[test]
    fn test_envelope_without_data_defaults_to_null() {
        // テスト項目: data が無いエンベロープは null として読み込まれる
        // given (前提条件):
        let text = r#"{"event":"join_quiz_room"}"#;

        // when (操作):
        let envelope: Envelope = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(envelope.event, "join_quiz_room");
        assert_eq!(envelope.data, Value::Null);
    }

    #[test]
    fn test_live_answer_payload_accepts_numbers_and_strings() {
        // テスト項目: ID は数値・文字列のどちらでも受け付ける
        // given (前提条件):
        let data = serde_json::json!({
            "studentId": "15",
            "studentName": "Hana",
            "quizId": 7,
            "questionId": 3,
            "selectedOptionId": "9",
            "optionText": "The new binding",
            "timestamp": "2025-03-01T10:00:00.000Z"
        });

        // when (操作):
        let payload: LiveAnswerUpdatePayload = serde_json::from_value(data).unwrap();

        // then (期待する結果):
        assert_eq!(payload.student_id, WireId::Text("15".to_string()));
        assert_eq!(payload.quiz_id, WireId::Number(7));
        assert_eq!(
            payload.timestamp,
            WireTimestamp::Text("2025-03-01T10:00:00.000Z".to_string())
        );
        assert_eq!(payload.professor_id, None);
    }

    #[test]
    fn test_live_answer_payload_missing_field_is_rejected() {
        // テスト項目: 必須フィールドが欠けたペイロードはエラー
        // given (前提条件):
        let data = serde_json::json!({
            "studentId": 15,
            "quizId": 7,
            "questionId": 3,
            "selectedOptionId": 9,
            "optionText": "x",
            "timestamp": 1
        });

        // when (操作):
        let result = serde_json::from_value::<LiveAnswerUpdatePayload>(data);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
