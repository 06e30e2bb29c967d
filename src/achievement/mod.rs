//! Achievements: milestone badges unlocked by the trigger rule set.
//!
//! The catalog is static and seeded at startup; unlocks are idempotent
//! (user, achievement) rows keyed by the first unlock timestamp.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub mod db;
mod list_endpoint;
mod rules;

pub use list_endpoint::get_achievements_endpoint;
pub use rules::{ActionCounters, triggered_codes};

/// A static catalog entry describing an unlockable badge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    /// The ID of the achievement.
    pub id: i64,
    /// The stable code the trigger rules refer to, e.g. "first-log".
    pub code: String,
    /// The display name.
    pub name: String,
    /// Flavor text describing how the badge is earned.
    pub description: String,
    /// The icon identifier for the client.
    pub icon: String,
}

/// A catalog entry joined with the caller's unlock status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementStatus {
    /// The catalog entry.
    #[serde(flatten)]
    pub achievement: Achievement,
    /// When the caller first unlocked the badge, or `None` if still locked.
    #[serde(with = "time::serde::rfc3339::option")]
    pub unlocked_at: Option<OffsetDateTime>,
}
