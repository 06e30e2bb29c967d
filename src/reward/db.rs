//! Database operations for game state.
//!
//! Reward application is a read-modify-write on a shared per-user row. To
//! avoid the lost-update race between two concurrent awards, the read and the
//! upsert always happen inside a single SQL transaction; callers never write
//! a [GameState](super::GameState) row directly.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserId,
    reward::{GameState, RewardConfig, apply_reward, apply_transaction_reward},
};

/// Initialize the game state table.
pub fn create_game_state_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS game_state (
            user_id TEXT PRIMARY KEY,
            xp INTEGER NOT NULL,
            level INTEGER NOT NULL,
            gold INTEGER NOT NULL,
            streak_count INTEGER NOT NULL,
            streak_last_date TEXT,
            updated_at TEXT NOT NULL
        );",
    )?;

    Ok(())
}

/// Retrieve a user's game state, or `None` if they have not earned a reward
/// yet.
pub fn get_game_state(user_id: &UserId, connection: &Connection) -> Result<Option<GameState>, Error> {
    let state = connection
        .prepare(
            "SELECT xp, level, gold, streak_count, streak_last_date
             FROM game_state WHERE user_id = ?1;",
        )?
        .query_row([user_id.as_str()], map_row);

    match state {
        Ok(state) => Ok(Some(state)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Award the per-transaction XP and gold and advance the streak, atomically.
///
/// Reads the current game state (defaulting to a fresh one on first use),
/// runs the reward calculator, and upserts the result, all inside one SQL
/// transaction.
pub fn grant_transaction_reward(
    user_id: &UserId,
    today: Date,
    yesterday: Date,
    config: &RewardConfig,
    connection: &Connection,
) -> Result<GameState, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let state = get_game_state(user_id, &sql_transaction)?.unwrap_or_default();
    let next = apply_transaction_reward(&state, today, yesterday, config);
    upsert_game_state(user_id, &next, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(next)
}

/// Award a bonus (e.g. from budget settlement) without touching the streak,
/// atomically.
pub fn grant_bonus_reward(
    user_id: &UserId,
    bonus_xp: i64,
    bonus_gold: i64,
    config: &RewardConfig,
    connection: &Connection,
) -> Result<GameState, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let state = get_game_state(user_id, &sql_transaction)?.unwrap_or_default();
    let next = apply_reward(&state, bonus_xp, bonus_gold, config);
    upsert_game_state(user_id, &next, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(next)
}

fn upsert_game_state(
    user_id: &UserId,
    state: &GameState,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO game_state (user_id, xp, level, gold, streak_count, streak_last_date, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(user_id) DO UPDATE SET
            xp = excluded.xp,
            level = excluded.level,
            gold = excluded.gold,
            streak_count = excluded.streak_count,
            streak_last_date = excluded.streak_last_date,
            updated_at = excluded.updated_at;",
        (
            user_id.as_str(),
            state.xp,
            state.level,
            state.gold,
            state.streak_count,
            state.streak_last_date,
            OffsetDateTime::now_utc(),
        ),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<GameState, rusqlite::Error> {
    Ok(GameState {
        xp: row.get(0)?,
        level: row.get(1)?,
        gold: row.get(2)?,
        streak_count: row.get(3)?,
        streak_last_date: row.get(4)?,
    })
}
