//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{RoomName, SessionId, SessionIdFactory},
    infrastructure::dto::{
        ClientEvent, decode_client_event, encode_event,
        websocket::{ConnectedPayload, EventName, RoomJoinedPayload},
    },
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    if let Err(e) = state.relay.ensure_started().await {
        tracing::error!("Refusing WebSocket upgrade: {}", e);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

/// Spawns a task that drains the session's channel into the WebSocket sender.
///
/// The channel closes when the session is unregistered or the transport is
/// drained; the socket is then closed.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = SessionIdFactory::generate();
    let (tx, rx) = mpsc::unbounded_channel();

    // The greeting is queued before registration so it precedes any fan-out.
    match encode_event(
        EventName::Connected,
        &ConnectedPayload {
            session_id: session_id.to_string(),
        },
    ) {
        Ok(greeting) => {
            let _ = tx.send(greeting);
        }
        Err(e) => tracing::error!("Failed to encode greeting: {}", e),
    }

    if let Err(e) = state.relay.on_connect(session_id.clone(), tx).await {
        tracing::error!("Failed to register session '{}': {}", session_id, e);
        return;
    }
    tracing::info!("Session '{}' connected", session_id);

    let (sender, mut receiver) = socket.split();

    let recv_state = state.clone();
    let recv_session = session_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on session '{}': {}", recv_session, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => dispatch(&recv_state, &recv_session, text.as_str()).await,
                Message::Binary(_) => {
                    tracing::warn!("Dropping binary frame from session '{}'", recv_session);
                }
                Message::Close(_) => {
                    tracing::info!("Session '{}' requested close", recv_session);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.relay.on_disconnect(&session_id).await;
}

/// Decode one text frame and hand it to the dispatcher.
///
/// Malformed frames are logged and dropped; the session stays open.
async fn dispatch(state: &AppState, session_id: &SessionId, text: &str) {
    let event = match decode_client_event(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Dropping frame from session '{}': {}", session_id, e);
            return;
        }
    };

    match event {
        ClientEvent::JoinUserRoom(user_id) => {
            let room = state.relay.on_join_user_room(session_id, user_id).await;
            acknowledge_join(state, session_id, room).await;
        }
        ClientEvent::JoinQuizRoom(quiz_id) => {
            let room = state.relay.on_join_quiz_room(session_id, quiz_id).await;
            acknowledge_join(state, session_id, room).await;
        }
        ClientEvent::JoinProfessorRoom(professor_id) => {
            let room = state
                .relay
                .on_join_professor_room(session_id, professor_id)
                .await;
            acknowledge_join(state, session_id, room).await;
        }
        ClientEvent::LiveAnswerUpdate { answer, data } => {
            let frame = match encode_event(EventName::LiveAnswerUpdate, &data) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Failed to encode live answer: {}", e);
                    return;
                }
            };
            if let Err(e) = state
                .relay
                .on_live_answer_update(session_id, &answer, &frame)
                .await
            {
                tracing::warn!("Failed to relay live answer: {}", e);
            }
        }
        ClientEvent::LiveQuizToggle {
            toggle,
            is_live_active,
            data,
        } => {
            let frame = match encode_event(EventName::live_toggle(is_live_active), &data) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Failed to encode live toggle: {}", e);
                    return;
                }
            };
            if let Err(e) = state
                .relay
                .on_live_quiz_toggle(session_id, &toggle, is_live_active, &frame)
                .await
            {
                tracing::warn!("Failed to relay live toggle: {}", e);
            }
        }
    }
}

async fn acknowledge_join(state: &AppState, session_id: &SessionId, room: RoomName) {
    let ack = RoomJoinedPayload {
        room: room.to_string(),
    };
    match encode_event(EventName::RoomJoined, &ack) {
        Ok(frame) => {
            if let Err(e) = state.relay.notify_session(session_id, &frame).await {
                tracing::warn!("Failed to acknowledge join for '{}': {}", session_id, e);
            }
        }
        Err(e) => tracing::error!("Failed to encode join acknowledgement: {}", e),
    }
}
