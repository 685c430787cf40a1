//! UseCase layer: relay dispatch, the live toggle state machine and quiz operations.

pub mod error;
pub mod get_quiz;
pub mod live_toggle;
pub mod relay_dispatcher;
pub mod submit_quiz;

pub use error::{GetQuizError, RelayError, SubmitQuizError, ToggleLiveError};
pub use get_quiz::{GetQuizUseCase, LiveStatus};
pub use live_toggle::{DEFAULT_CONFIRM_DELAY, LiveToggleUseCase};
pub use relay_dispatcher::{RelayDispatcher, ShutdownReport};
pub use submit_quiz::SubmitQuizUseCase;
