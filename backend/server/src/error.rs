use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Faults of the ordered-set backend. Never leave the engine.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Backend call timed out")]
    Timeout,

    #[error("Backend reconnect already in progress")]
    Reconnecting,

    #[error("Corrupt leaderboard member: {0}")]
    CorruptMember(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LeaderboardError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Leaderboard temporarily unavailable")]
    BackendUnavailable,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing data")]
    MalformedPayload,

    #[error("Player not found")]
    NotFound,

    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Leaderboard(LeaderboardError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Leaderboard(LeaderboardError::BackendUnavailable) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let body = json!({
            "success": false,
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
