use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    entry::Standing,
    error::AppError,
    state::SharedState,
    utils::get_submission,
};

#[derive(Serialize)]
pub struct Saved {
    success: bool,
    message: &'static str,
    score: u64,
}

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    limit: Option<String>,
}

#[derive(Serialize)]
pub struct Board {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    leaderboard: Vec<Standing>,
}

pub async fn save_score_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|_| AppError::MalformedPayload)?;
    let (player, score) = get_submission(&payload)?;

    let entry = state.leaderboard.add_score(&player, score).await?;

    let saved = Saved {
        success: true,
        message: "Score saved",
        score: entry.seq,
    };

    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn leaderboard_handler(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> impl IntoResponse {
    // unparsable limits fall back to the default rather than failing the read
    let limit = query
        .limit
        .and_then(|limit| limit.trim().parse::<i64>().ok())
        .unwrap_or(0);

    let leaderboard = state.leaderboard.top_scores(limit).await;
    let message = leaderboard.is_empty().then_some("No scores yet");

    Json(Board {
        success: true,
        message,
        leaderboard,
    })
}

pub async fn rank_handler(
    State(state): State<SharedState>,
    Path(player): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rank = state
        .leaderboard
        .player_rank(&player)
        .await
        .ok_or(AppError::NotFound)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "player": player,
        "rank": rank,
    })))
}

pub async fn count_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let total = state.leaderboard.total_scores().await;

    Json(serde_json::json!({
        "success": true,
        "total": total,
    }))
}

pub async fn clear_handler(State(state): State<SharedState>) -> Response {
    if state.leaderboard.clear().await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}
