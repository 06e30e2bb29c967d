//! Database operations for achievements.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserId,
    achievement::{Achievement, AchievementStatus, ActionCounters, triggered_codes},
};

/// Initialize the achievement catalog and unlock tables.
pub fn create_achievement_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS achievement (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            icon TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_achievement (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            achievement_id INTEGER NOT NULL REFERENCES achievement(id),
            unlocked_at TEXT NOT NULL,
            UNIQUE(user_id, achievement_id)
        );",
    )?;

    Ok(())
}

/// Seed the static achievement catalog.
///
/// Codes must stay in sync with the trigger rule table; re-running the seed
/// is a no-op.
pub fn seed_achievements(connection: &Connection) -> Result<(), rusqlite::Error> {
    let catalog = [
        (
            "first-log",
            "First Entry in the Ledger",
            "Log your first transaction.",
            "quill",
        ),
        (
            "steady-hand",
            "Steady Hand",
            "Keep a three day logging streak.",
            "hourglass",
        ),
        (
            "streak-7",
            "Week of Discipline",
            "Keep a seven day logging streak.",
            "calendar",
        ),
        (
            "guild-treasurer",
            "Guild Treasurer",
            "Log fifty transactions.",
            "chest",
        ),
        (
            "armory-collector",
            "Armory Collector",
            "Own five pieces of gear.",
            "helmet",
        ),
        (
            "budget-keeper",
            "Budget Keeper",
            "Stay under budget in three categories in one month.",
            "shield",
        ),
    ];

    let mut statement = connection.prepare(
        "INSERT INTO achievement (code, name, description, icon)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(code) DO NOTHING;",
    )?;

    for (code, name, description, icon) in catalog {
        statement.execute((code, name, description, icon))?;
    }

    Ok(())
}

/// Look up a catalog entry by its code.
pub fn find_achievement_by_code(
    code: &str,
    connection: &Connection,
) -> Result<Option<Achievement>, Error> {
    let achievement = connection
        .prepare("SELECT id, code, name, description, icon FROM achievement WHERE code = ?1;")?
        .query_row([code], map_achievement_row);

    match achievement {
        Ok(achievement) => Ok(Some(achievement)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Unlock an achievement for a user, keeping the first unlock timestamp.
///
/// Returns `true` if the achievement was newly unlocked. Re-unlocking is a
/// no-op, and so is an unknown code: the catalog and the rule table must stay
/// in sync, but a missing catalog row must not fail the parent request.
pub fn unlock_achievement(
    user_id: &UserId,
    code: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<bool, Error> {
    let Some(achievement) = find_achievement_by_code(code, connection)? else {
        tracing::warn!("achievement code {code} is not in the catalog, skipping unlock");
        return Ok(false);
    };

    let inserted = connection.execute(
        "INSERT INTO user_achievement (user_id, achievement_id, unlocked_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, achievement_id) DO NOTHING;",
        (user_id.as_str(), achievement.id, now),
    )?;

    Ok(inserted > 0)
}

/// Run the trigger rule table against `counters` and unlock everything that
/// matches. Returns the codes that were newly unlocked.
pub fn evaluate_triggers(
    user_id: &UserId,
    counters: &ActionCounters,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Vec<&'static str>, Error> {
    let mut newly_unlocked = Vec::new();

    for code in triggered_codes(counters) {
        if unlock_achievement(user_id, code, now, connection)? {
            tracing::info!("user {user_id} unlocked achievement {code}");
            newly_unlocked.push(code);
        }
    }

    Ok(newly_unlocked)
}

/// The full catalog joined with the caller's unlock timestamps.
pub fn list_achievements_with_status(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<AchievementStatus>, Error> {
    connection
        .prepare(
            "SELECT a.id, a.code, a.name, a.description, a.icon, ua.unlocked_at
             FROM achievement a
             LEFT JOIN user_achievement ua
                ON ua.achievement_id = a.id AND ua.user_id = ?1
             ORDER BY a.id ASC;",
        )?
        .query_map([user_id.as_str()], |row| {
            Ok(AchievementStatus {
                achievement: map_achievement_row(row)?,
                unlocked_at: row.get(5)?,
            })
        })?
        .map(|maybe_status| maybe_status.map_err(|error| error.into()))
        .collect()
}

fn map_achievement_row(row: &Row) -> Result<Achievement, rusqlite::Error> {
    Ok(Achievement {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        icon: row.get(4)?,
    })
}
