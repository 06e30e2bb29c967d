//! Savings missions: self-set goals with an XP/gold reward attached.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::UserId;

pub mod db;
mod endpoints;

pub use endpoints::{complete_mission_endpoint, create_mission_endpoint, get_missions_endpoint};

/// The lifecycle state of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    /// The mission is in progress and counts toward the active mission cap.
    Active,
    /// The mission has been marked done.
    Completed,
}

impl ToSql for MissionStatus {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>, rusqlite::Error> {
        let text = match self {
            MissionStatus::Active => "active",
            MissionStatus::Completed => "completed",
        };

        Ok(text.into())
    }
}

impl FromSql for MissionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "active" => Ok(MissionStatus::Active),
            "completed" => Ok(MissionStatus::Completed),
            other => Err(FromSqlError::Other(
                format!("unknown mission status {other}").into(),
            )),
        }
    }
}

/// A savings goal the user set for themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    /// The ID of the mission.
    pub id: i64,
    /// The user the mission belongs to.
    pub user_id: UserId,
    /// A short description of the goal.
    pub title: String,
    /// The amount to save.
    pub target_amount: f64,
    /// The amount saved so far.
    pub current_amount: f64,
    /// Whether the mission is active or completed.
    pub status: MissionStatus,
    /// The XP promised on completion.
    pub reward_xp: i64,
    /// The gold promised on completion.
    pub reward_gold: i64,
    /// When the mission was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the mission was completed, if it has been.
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}
