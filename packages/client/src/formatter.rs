//! Event formatting utilities for client display.

use classpoll_server::{
    domain::Timestamp,
    infrastructure::dto::websocket::{
        ConnectedPayload, Envelope, EventName, LiveAnswerUpdatePayload, LiveQuizTogglePayload,
        RoomJoinedPayload, WireId, WireTimestamp,
    },
};
use classpoll_shared::time::timestamp_to_rfc3339;

/// Event formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one text frame received from the server
    ///
    /// Frames that are not a known event are shown raw.
    pub fn format_frame(text: &str) -> String {
        let Ok(envelope) = serde_json::from_str::<Envelope>(text) else {
            return Self::format_raw_message(text);
        };
        let Some(event) = EventName::parse(&envelope.event) else {
            return Self::format_raw_message(text);
        };

        let formatted = match event {
            EventName::Connected => serde_json::from_value::<ConnectedPayload>(envelope.data)
                .ok()
                .map(|p| Self::format_connected(&p.session_id)),
            EventName::RoomJoined => serde_json::from_value::<RoomJoinedPayload>(envelope.data)
                .ok()
                .map(|p| Self::format_room_joined(&p.room)),
            EventName::LiveAnswerUpdate => {
                serde_json::from_value::<LiveAnswerUpdatePayload>(envelope.data)
                    .ok()
                    .map(|p| Self::format_live_answer(&p))
            }
            EventName::LiveQuizActivate | EventName::LiveQuizDeactivate => {
                serde_json::from_value::<LiveQuizTogglePayload>(envelope.data)
                    .ok()
                    .map(|p| Self::format_live_toggle(&p, event == EventName::LiveQuizActivate))
            }
            EventName::JoinUserRoom | EventName::JoinQuizRoom | EventName::JoinProfessorRoom => {
                None
            }
        };
        formatted.unwrap_or_else(|| Self::format_raw_message(text))
    }

    pub fn format_connected(session_id: &str) -> String {
        format!("\n* connected as session {}\n", session_id)
    }

    pub fn format_room_joined(room: &str) -> String {
        format!("* joined {}\n", room)
    }

    /// Format a live answer
    ///
    /// # Arguments
    ///
    /// * `payload` - The relayed `live_answer_update` data
    ///
    /// # Returns
    ///
    /// A formatted string naming the student, question and chosen option
    pub fn format_live_answer(payload: &LiveAnswerUpdatePayload) -> String {
        format!(
            "\n\n------------------------------------------------------------\n\
             @{} (student {}) answered question {}: {} (option {})\n\
             at {}\n\
             ------------------------------------------------------------\n",
            payload.student_name,
            wire_id(&payload.student_id),
            wire_id(&payload.question_id),
            payload.option_text,
            wire_id(&payload.selected_option_id),
            wire_timestamp(&payload.timestamp)
        )
    }

    pub fn format_live_toggle(payload: &LiveQuizTogglePayload, is_live_active: bool) -> String {
        let verb = if is_live_active {
            "started"
        } else {
            "stopped"
        };
        format!(
            "\n>>> {} {} quiz '{}' (quiz {}, class {}) at {}\n",
            payload.professor_name,
            verb,
            payload.quiz_title,
            wire_id(&payload.quiz_id),
            wire_id(&payload.class_id),
            wire_timestamp(&payload.timestamp)
        )
    }

    /// Format a confirmation after an answer was sent
    pub fn format_sent_confirmation(sent_at: i64) -> String {
        format!("sent at {}\n", timestamp_to_rfc3339(sent_at))
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

fn wire_id(id: &WireId) -> String {
    match id {
        WireId::Number(value) => value.to_string(),
        WireId::Text(value) => value.clone(),
    }
}

fn wire_timestamp(timestamp: &WireTimestamp) -> String {
    match Timestamp::try_from(timestamp) {
        Ok(ts) => timestamp_to_rfc3339(ts.value()),
        Err(_) => match timestamp {
            WireTimestamp::Millis(ms) => ms.to_string(),
            WireTimestamp::Text(text) => text.clone(),
        },
    }
}
