//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{GetQuizUseCase, LiveToggleUseCase, RelayDispatcher, SubmitQuizUseCase};

use super::{
    handler::{
        debug_rooms, get_live_state, get_quiz, health_check, submit_quiz, toggle_live,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Live quiz relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(relay, live_toggle, get_quiz, submit_quiz);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `relay` - Dispatcher for WebSocket events
    /// * `live_toggle` - Broadcast-then-confirm state machine
    /// * `get_quiz` - UseCase for quiz and live state queries
    /// * `submit_quiz` - UseCase for final submissions
    pub fn new(
        relay: Arc<RelayDispatcher>,
        live_toggle: Arc<LiveToggleUseCase>,
        get_quiz: Arc<GetQuizUseCase>,
        submit_quiz: Arc<SubmitQuizUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                relay,
                live_toggle,
                get_quiz,
                submit_quiz,
            }),
        }
    }

    fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/quizzes/{quiz_id}", get(get_quiz))
            .route(
                "/api/quizzes/{quiz_id}/live",
                get(get_live_state).post(toggle_live),
            )
            .route("/api/quizzes/{quiz_id}/submissions", post(submit_quiz))
            .route("/debug/rooms", get(debug_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the relay server until Ctrl+C / SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.run_with_listener(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The realtime transport is started before the first connection is
    /// accepted, and all relay state is drained once `shutdown` resolves.
    pub async fn run_with_listener<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.state.relay.start().await;

        let app = self.router();
        let relay = self.state.relay.clone();

        tracing::info!("Live relay server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                let report = relay.shutdown().await;
                tracing::info!(
                    "Relay drained: {} session(s) closed, {} pending confirmation(s) lost",
                    report.dropped_sessions,
                    report.lost_confirmations.len()
                );
            })
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
