//! Documentation of the click game backend.
//!
//! The browser game counts clicks against a timer and posts the final score
//! here. This service keeps the ranked board and answers leaderboard reads.
//!
//!
//!
//! # General Infrastructure
//! - Frontend talks to this server over JSON
//! - Server keeps the ranked board either in process or in Redis
//! - With Redis, any number of server replicas share one board
//! - Long term score history is not kept here, only the capped board
//!
//!
//!
//! # Endpoints
//!
//! | Method | Path                          | Notes                                 |
//! |--------|-------------------------------|---------------------------------------|
//! | POST   | `/save-score`                 | `{player, score}`, 201 / 400 / 503    |
//! | GET    | `/leaderboard?limit=N`        | always 200, empty list when degraded  |
//! | GET    | `/leaderboard/rank/{player}`  | rank of the player's best score       |
//! | GET    | `/leaderboard/count`          | entries on the board                  |
//! | DELETE | `/leaderboard`                | only with `ADMIN_ROUTES=true`         |
//!
//!
//!
//! # Notes
//!
//! ## Why a capped board
//! The board keeps every submission, several per player, so a player's
//! history within the window stays visible. Capping at 1000 entries keeps the
//! sorted set small enough that full scans (player lookups on Redis) stay
//! cheap and memory stays flat.
//!
//! ## Degraded reads
//! A leaderboard that cannot be read shows as empty, never as a 500. The
//! game page renders "no scores yet" and keeps working.
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! Run against a local Redis.
//! ```sh
//! LEADERBOARD_BACKEND=redis REDIS_URL=redis://localhost:6379 RUST_LOG=info cargo run
//! ```
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{delete, get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod entry;
pub mod error;
pub mod leaderboard;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use config::Config;
use routes::{
    clear_handler, count_handler, leaderboard_handler, rank_handler, save_score_handler,
};
use state::{SharedState, State};

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let config = Config::load();
    let state = State::new(config).expect("Leaderboard backend misconfigured!");

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutting down...");
}

pub fn app(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let mut router = Router::new()
        .route("/save-score", post(save_score_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/leaderboard/count", get(count_handler))
        .route("/leaderboard/rank/{player}", get(rank_handler));

    if state.config.admin_routes {
        info!("Admin routes enabled");
        router = router.route("/leaderboard", delete(clear_handler));
    }

    router.layer(cors).with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
