//! Data Transfer Objects (DTOs) for the relay server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event envelopes and payloads
//! - `http`: HTTP API request / response bodies
//! - `seed`: quiz fixture file format
//! - `conversion`: DTO ⇔ domain conversions and the event codec

pub mod conversion;
pub mod http;
pub mod seed;
pub mod websocket;

pub use conversion::{ClientEvent, DecodeError, decode_client_event, encode_event};
