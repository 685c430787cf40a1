//! Live session relay for Classpoll.
//!
//! Relays live answers from students to professors and broadcasts quiz
//! activation over WebSocket rooms, confirming the activation in the quiz
//! store after a short delay.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
