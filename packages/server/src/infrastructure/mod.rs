//! Infrastructure layer: DTOs, repository implementations and the WebSocket pusher.

pub mod dto;
pub mod message_pusher;
pub mod repository;
