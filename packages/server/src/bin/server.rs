//! Live quiz relay server.
//!
//! Relays live answers to professors and broadcasts quiz activation to the
//! students in a quiz room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin classpoll-server
//! cargo run --bin classpoll-server -- --host 0.0.0.0 --port 3000 --seed seed/quizzes.json
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use classpoll_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryQuizRepository, InMemoryRoomRepository, InMemorySubmissionRepository,
            load_quizzes,
        },
    },
    ui::Server,
    usecase::{GetQuizUseCase, LiveToggleUseCase, RelayDispatcher, SubmitQuizUseCase},
};
use classpoll_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "classpoll-server")]
#[command(about = "Live quiz relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Delay between a live toggle broadcast and its confirmation write
    #[arg(long, default_value = "1000")]
    confirm_delay_ms: u64,

    /// JSON file of quizzes to preload into the store
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &["classpoll_server"], "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repositories (in-memory database)
    let quizzes = match &args.seed {
        Some(path) => match load_quizzes(path).await {
            Ok(quizzes) => quizzes,
            Err(e) => {
                tracing::error!("Failed to load seed '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Vec::new(),
    };
    let quiz_repository = Arc::new(InMemoryQuizRepository::with_quizzes(quizzes));
    let room_repository = Arc::new(InMemoryRoomRepository::new());
    let submission_repository = Arc::new(InMemorySubmissionRepository::new());
    let clock = Arc::new(SystemClock);

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let live_toggle = Arc::new(LiveToggleUseCase::new(
        quiz_repository.clone(),
        room_repository.clone(),
        message_pusher.clone(),
        clock.clone(),
        Duration::from_millis(args.confirm_delay_ms),
    ));
    let relay = Arc::new(RelayDispatcher::new(
        room_repository,
        message_pusher,
        live_toggle.clone(),
    ));
    let get_quiz = Arc::new(GetQuizUseCase::new(
        quiz_repository.clone(),
        live_toggle.clone(),
    ));
    let submit_quiz = Arc::new(SubmitQuizUseCase::new(
        quiz_repository,
        submission_repository,
        clock,
    ));

    // 4. Create and run the server
    let server = Server::new(relay, live_toggle, get_quiz, submit_quiz);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
