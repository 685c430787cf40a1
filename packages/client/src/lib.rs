//! CLI client for the Classpoll live relay.
//!
//! - `session`: WebSocket session (watch a room, send live answers)
//! - `runner`: reconnection loop around a session
//! - `http`: HTTP API calls (toggle a quiz live, submit answers)
//! - `formatter`: display of server events

pub mod error;
pub mod formatter;
pub mod http;
pub mod runner;
pub mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;
pub use session::{SessionPlan, StudentIdentity};
