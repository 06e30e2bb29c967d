//! Profile endpoints: the "who am I" view, settings, and onboarding.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, UserId,
    profile::db::{get_profile, upsert_avatar, upsert_timezone},
    reward::db::get_game_state,
    timezone::validate_timezone,
};

/// Return the caller's profile and game state.
///
/// # Errors
/// Returns [Error::NotFound] if the caller has no profile yet.
pub async fn get_me_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Response, Error> {
    let connection = state.connection()?;

    let profile = get_profile(&user_id, &connection)?.ok_or(Error::NotFound)?;
    let game_state = get_game_state(&user_id, &connection)?;

    Ok(Json(json!({ "profile": profile, "game_state": game_state })).into_response())
}

/// The body of a settings update request.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    /// The caller's canonical IANA timezone.
    pub timezone: String,
}

/// Update the caller's settings (currently just the timezone).
pub async fn update_settings_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Json(form): Json<SettingsForm>,
) -> Result<Response, Error> {
    validate_timezone(&form.timezone)?;

    let connection = state.connection()?;
    let profile = upsert_timezone(&user_id, &form.timezone, &connection)?;

    Ok(Json(json!({ "profile": profile })).into_response())
}

/// The body of an onboarding request.
#[derive(Debug, Deserialize)]
pub struct AvatarForm {
    /// The chosen avatar class.
    pub class_id: String,
    /// The chosen avatar appearance.
    pub appearance_id: String,
    /// The account balance the user starts tracking from.
    pub starting_balance: f64,
}

/// Record the caller's avatar choices made during onboarding.
pub async fn post_avatar_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Json(form): Json<AvatarForm>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let profile = upsert_avatar(
        &user_id,
        &form.class_id,
        &form.appearance_id,
        form.starting_balance,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(json!({ "profile": profile }))).into_response())
}

#[cfg(test)]
mod profile_endpoint_tests {
    use axum::{
        Router,
        http::{HeaderName, HeaderValue, StatusCode},
        routing::{get, patch, post},
    };
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{AppState, endpoints};

    use super::{get_me_endpoint, post_avatar_endpoint, update_settings_endpoint};

    fn test_server() -> TestServer {
        let app = Router::new()
            .route(endpoints::ME, get(get_me_endpoint))
            .route(endpoints::ME_SETTINGS, patch(update_settings_endpoint))
            .route(endpoints::AVATAR, post(post_avatar_endpoint))
            .with_state(AppState::new_test());

        TestServer::new(app)
    }

    fn user_header() -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_static("user-1"),
        )
    }

    #[tokio::test]
    async fn me_is_not_found_before_onboarding() {
        let server = test_server();
        let (name, value) = user_header();

        let response = server.get(endpoints::ME).add_header(name, value).await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn onboarding_then_me_round_trips() {
        let server = test_server();
        let (name, value) = user_header();

        let created = server
            .post(endpoints::AVATAR)
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "class_id": "miner",
                "appearance_id": "dwarf-3",
                "starting_balance": 1200.0
            }))
            .await;
        created.assert_status(StatusCode::CREATED);

        let me = server.get(endpoints::ME).add_header(name, value).await;
        me.assert_status(StatusCode::OK);

        let body: serde_json::Value = me.json();
        assert_eq!(body["profile"]["class"], "miner");
        // No reward has been earned yet.
        assert_eq!(body["game_state"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn settings_rejects_unknown_timezone() {
        let server = test_server();
        let (name, value) = user_header();

        let response = server
            .patch(endpoints::ME_SETTINGS)
            .add_header(name, value)
            .json(&json!({ "timezone": "Middle/Nowhere" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn settings_stores_valid_timezone() {
        let server = test_server();
        let (name, value) = user_header();

        let response = server
            .patch(endpoints::ME_SETTINGS)
            .add_header(name, value)
            .json(&json!({ "timezone": "Europe/Lisbon" }))
            .await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["profile"]["timezone"], "Europe/Lisbon");
    }
}
