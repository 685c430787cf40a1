//! Shared utilities for the Classpoll server and client.

pub mod logger;
pub mod time;
