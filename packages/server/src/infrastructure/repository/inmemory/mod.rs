//! In-memory implementations of the domain repositories.

mod quiz;
mod room;
mod submission;

pub use quiz::InMemoryQuizRepository;
pub use room::InMemoryRoomRepository;
pub use submission::InMemorySubmissionRepository;
