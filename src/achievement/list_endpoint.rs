//! The achievements listing endpoint.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState, Error, UserId,
    achievement::db::list_achievements_with_status,
};

/// Return the achievement catalog annotated with the caller's unlock status.
pub async fn get_achievements_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let achievements = list_achievements_with_status(&user_id, &connection)?;

    Ok(Json(json!({ "achievements": achievements })).into_response())
}
