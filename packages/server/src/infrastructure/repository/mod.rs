//! Repository implementations.
//!
//! - `inmemory`: HashMap ベースの実装
//! - `seed`: JSON シードファイルからのクイズ読み込み

pub mod inmemory;
pub mod seed;

pub use inmemory::{InMemoryQuizRepository, InMemoryRoomRepository, InMemorySubmissionRepository};
pub use seed::{SeedError, load_quizzes, parse_quizzes};
