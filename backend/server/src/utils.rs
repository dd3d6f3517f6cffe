use serde_json::Value;

use crate::error::AppError::{self, MalformedPayload};

/// Pulls `player` and `score` out of a submission body.
///
/// Both must be present. The player may be any JSON string (blank is fine,
/// the leaderboard names it), the score must be an integer, either as a JSON
/// number or a numeric string.
pub fn get_submission(body: &Value) -> Result<(String, i64), AppError> {
    let player = match body.get("player") {
        Some(Value::String(player)) => player.clone(),
        Some(Value::Null) | None => return Err(MalformedPayload),
        Some(other) => other.to_string(),
    };

    let score = match body.get("score") {
        Some(Value::Number(number)) => number.as_i64().ok_or(MalformedPayload)?,
        Some(Value::String(text)) => text.trim().parse().map_err(|_| MalformedPayload)?,
        _ => return Err(MalformedPayload),
    };

    Ok((player, score))
}
