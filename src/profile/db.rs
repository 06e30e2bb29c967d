//! Database operations for profiles.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, UserId, profile::Profile};

/// Initialize the profile table.
pub fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS profile (
            user_id TEXT PRIMARY KEY,
            display_name TEXT,
            class TEXT,
            appearance_id TEXT,
            starting_balance REAL,
            timezone TEXT,
            created_at TEXT NOT NULL
        );",
    )?;

    Ok(())
}

/// Retrieve a user's profile, or `None` if they have not onboarded.
pub fn get_profile(user_id: &UserId, connection: &Connection) -> Result<Option<Profile>, Error> {
    let profile = connection
        .prepare(
            "SELECT user_id, display_name, class, appearance_id, starting_balance, timezone, created_at
             FROM profile WHERE user_id = ?1;",
        )?
        .query_row([user_id.as_str()], map_row);

    match profile {
        Ok(profile) => Ok(Some(profile)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// The user's configured timezone, if any.
pub fn get_timezone(user_id: &UserId, connection: &Connection) -> Result<Option<String>, Error> {
    Ok(get_profile(user_id, connection)?.and_then(|profile| profile.timezone))
}

/// Record the avatar choices made during onboarding, creating the profile
/// row on first use.
pub fn upsert_avatar(
    user_id: &UserId,
    class: &str,
    appearance_id: &str,
    starting_balance: f64,
    connection: &Connection,
) -> Result<Profile, Error> {
    let profile = connection
        .prepare(
            "INSERT INTO profile (user_id, class, appearance_id, starting_balance, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                class = excluded.class,
                appearance_id = excluded.appearance_id,
                starting_balance = excluded.starting_balance
             RETURNING user_id, display_name, class, appearance_id, starting_balance, timezone, created_at;",
        )?
        .query_row(
            (
                user_id.as_str(),
                class,
                appearance_id,
                starting_balance,
                OffsetDateTime::now_utc(),
            ),
            map_row,
        )?;

    Ok(profile)
}

/// Update a user's timezone setting, creating the profile row on first use.
pub fn upsert_timezone(
    user_id: &UserId,
    timezone: &str,
    connection: &Connection,
) -> Result<Profile, Error> {
    let profile = connection
        .prepare(
            "INSERT INTO profile (user_id, timezone, created_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET timezone = excluded.timezone
             RETURNING user_id, display_name, class, appearance_id, starting_balance, timezone, created_at;",
        )?
        .query_row(
            (user_id.as_str(), timezone, OffsetDateTime::now_utc()),
            map_row,
        )?;

    Ok(profile)
}

fn map_row(row: &Row) -> Result<Profile, rusqlite::Error> {
    Ok(Profile {
        user_id: UserId::new(row.get::<_, String>(0)?),
        display_name: row.get(1)?,
        class: row.get(2)?,
        appearance_id: row.get(3)?,
        starting_balance: row.get(4)?,
        timezone: row.get(5)?,
        created_at: row.get(6)?,
    })
}
