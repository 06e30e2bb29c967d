//! User profiles: onboarding data and per-user settings.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::UserId;

pub mod db;
mod endpoints;

pub use endpoints::{get_me_endpoint, post_avatar_endpoint, update_settings_endpoint};

/// Resolve the timezone for date calculations: the caller's configured
/// timezone, else the `x-user-timezone` header, else the server's fallback
/// zone.
pub fn resolve_timezone(
    user_id: &UserId,
    header_timezone: Option<&str>,
    fallback: &str,
    connection: &rusqlite::Connection,
) -> Result<String, crate::Error> {
    if let Some(timezone) = db::get_timezone(user_id, connection)? {
        return Ok(timezone);
    }

    Ok(header_timezone.unwrap_or(fallback).to_owned())
}

/// A user's profile: avatar choices made during onboarding plus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// The user the profile belongs to.
    pub user_id: UserId,
    /// The display name shown in game views.
    pub display_name: Option<String>,
    /// The avatar class chosen during onboarding, e.g. "miner".
    pub class: Option<String>,
    /// The avatar appearance identifier.
    pub appearance_id: Option<String>,
    /// The account balance the user started tracking from.
    pub starting_balance: Option<f64>,
    /// The user's canonical IANA timezone, e.g. "Europe/Lisbon".
    pub timezone: Option<String>,
    /// When the profile was first created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
