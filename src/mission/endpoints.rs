//! Mission endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    AppState, Error, UserId,
    mission::db::{complete_mission, insert_mission, list_missions},
};

/// The body of a mission creation request.
#[derive(Debug, Deserialize)]
pub struct MissionForm {
    /// A short description of the goal.
    pub title: String,
    /// The amount to save.
    pub target_amount: f64,
    /// The XP promised on completion.
    #[serde(default)]
    pub reward_xp: i64,
    /// The gold promised on completion.
    #[serde(default)]
    pub reward_gold: i64,
}

/// Create a mission. Fails when the caller is already at the active cap.
pub async fn create_mission_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Json(form): Json<MissionForm>,
) -> Result<Response, Error> {
    if !form.target_amount.is_finite() || form.target_amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let connection = state.connection()?;
    let mission = insert_mission(
        &user_id,
        form.title.trim(),
        form.target_amount,
        form.reward_xp,
        form.reward_gold,
        OffsetDateTime::now_utc(),
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(json!({ "mission": mission }))).into_response())
}

/// Return the caller's missions, newest first.
pub async fn get_missions_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let missions = list_missions(&user_id, &connection)?;

    Ok(Json(json!({ "missions": missions })).into_response())
}

/// Mark a mission completed. Completion grants no reward, the mission's
/// promised XP and gold are display-only.
pub async fn complete_mission_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Path(mission_id): Path<i64>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let mission = complete_mission(
        &user_id,
        mission_id,
        OffsetDateTime::now_utc(),
        &connection,
    )?;

    Ok(Json(json!({ "mission": mission })).into_response())
}
