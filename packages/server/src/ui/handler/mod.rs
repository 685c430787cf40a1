//! Request handlers.

mod http;
mod websocket;

pub use http::{debug_rooms, get_live_state, get_quiz, health_check, submit_quiz, toggle_live};
pub use websocket::websocket_handler;
