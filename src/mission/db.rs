//! Database operations for missions.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserId,
    mission::{Mission, MissionStatus},
};

/// The most missions a user may have active at once.
pub const MAX_ACTIVE_MISSIONS: i64 = 3;

/// Initialize the mission table.
pub fn create_mission_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS mission (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            target_amount REAL NOT NULL,
            current_amount REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active',
            reward_xp INTEGER NOT NULL DEFAULT 0,
            reward_gold INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            completed_at TEXT
        );",
    )?;

    Ok(())
}

/// Create a mission, enforcing the active mission cap.
///
/// The cap check and the insert run in one SQL transaction so concurrent
/// creates cannot both slip under the cap.
///
/// # Errors
/// Returns [Error::MaxActiveMissions] when the user already has
/// [MAX_ACTIVE_MISSIONS] active missions.
pub fn insert_mission(
    user_id: &UserId,
    title: &str,
    target_amount: f64,
    reward_xp: i64,
    reward_gold: i64,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Mission, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let active_count: i64 = sql_transaction
        .prepare("SELECT COUNT(*) FROM mission WHERE user_id = ?1 AND status = 'active';")?
        .query_row([user_id.as_str()], |row| row.get(0))?;

    if active_count >= MAX_ACTIVE_MISSIONS {
        return Err(Error::MaxActiveMissions);
    }

    let mission = sql_transaction
        .prepare(
            "INSERT INTO mission
                (user_id, title, target_amount, reward_xp, reward_gold, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, title, target_amount, current_amount, status,
                reward_xp, reward_gold, created_at, completed_at;",
        )?
        .query_row(
            (
                user_id.as_str(),
                title,
                target_amount,
                reward_xp,
                reward_gold,
                now,
            ),
            map_row,
        )?;

    sql_transaction.commit()?;

    Ok(mission)
}

/// The user's missions, newest first.
pub fn list_missions(user_id: &UserId, connection: &Connection) -> Result<Vec<Mission>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, target_amount, current_amount, status,
                reward_xp, reward_gold, created_at, completed_at
             FROM mission WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC;",
        )?
        .query_map([user_id.as_str()], map_row)?
        .map(|maybe_mission| maybe_mission.map_err(|error| error.into()))
        .collect()
}

/// Mark an active mission completed.
///
/// # Errors
/// Returns [Error::NotFound] if the mission does not exist, belongs to
/// another user, or is already completed.
pub fn complete_mission(
    user_id: &UserId,
    mission_id: i64,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Mission, Error> {
    connection
        .prepare(
            "UPDATE mission
             SET status = 'completed', current_amount = target_amount, completed_at = ?1
             WHERE id = ?2 AND user_id = ?3 AND status = 'active'
             RETURNING id, user_id, title, target_amount, current_amount, status,
                reward_xp, reward_gold, created_at, completed_at;",
        )?
        .query_row((now, mission_id, user_id.as_str()), map_row)
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<Mission, rusqlite::Error> {
    Ok(Mission {
        id: row.get(0)?,
        user_id: UserId::new(row.get::<_, String>(1)?),
        title: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        status: row.get(5)?,
        reward_xp: row.get(6)?,
        reward_gold: row.get(7)?,
        created_at: row.get(8)?,
        completed_at: row.get(9)?,
    })
}

#[cfg(test)]
mod mission_db_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{Error, UserId, db::initialize};

    use super::*;

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");

        connection
    }

    #[test]
    fn fourth_active_mission_is_rejected() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");
        let now = datetime!(2026-08-30 12:00 UTC);

        for n in 0..3 {
            insert_mission(&user_id, &format!("goal {n}"), 100.0, 50, 10, now, &connection)
                .unwrap();
        }

        let got = insert_mission(&user_id, "one too many", 100.0, 50, 10, now, &connection);

        assert_eq!(got.unwrap_err(), Error::MaxActiveMissions);
        assert_eq!(list_missions(&user_id, &connection).unwrap().len(), 3);
    }

    #[test]
    fn completing_a_mission_frees_a_slot() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");
        let now = datetime!(2026-08-30 12:00 UTC);

        let missions: Vec<Mission> = (0..3)
            .map(|n| {
                insert_mission(&user_id, &format!("goal {n}"), 100.0, 0, 0, now, &connection)
                    .unwrap()
            })
            .collect();

        let completed = complete_mission(&user_id, missions[0].id, now, &connection).unwrap();
        assert_eq!(completed.status, MissionStatus::Completed);
        assert_eq!(completed.current_amount, completed.target_amount);
        assert_eq!(completed.completed_at, Some(now));

        insert_mission(&user_id, "replacement", 50.0, 0, 0, now, &connection).unwrap();
    }

    #[test]
    fn completion_requires_ownership() {
        let connection = get_test_connection();
        let owner = UserId::new("user-1");
        let now = datetime!(2026-08-30 12:00 UTC);

        let mission = insert_mission(&owner, "goal", 100.0, 0, 0, now, &connection).unwrap();

        let got = complete_mission(&UserId::new("user-2"), mission.id, now, &connection);

        assert_eq!(got.unwrap_err(), Error::NotFound);
    }

    #[test]
    fn completing_twice_is_not_found() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");
        let now = datetime!(2026-08-30 12:00 UTC);

        let mission = insert_mission(&user_id, "goal", 100.0, 0, 0, now, &connection).unwrap();

        complete_mission(&user_id, mission.id, now, &connection).unwrap();
        let got = complete_mission(&user_id, mission.id, now, &connection);

        assert_eq!(got.unwrap_err(), Error::NotFound);
    }

    #[test]
    fn list_is_newest_first() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");

        insert_mission(
            &user_id,
            "older",
            100.0,
            0,
            0,
            datetime!(2026-08-01 12:00 UTC),
            &connection,
        )
        .unwrap();
        insert_mission(
            &user_id,
            "newer",
            100.0,
            0,
            0,
            datetime!(2026-08-20 12:00 UTC),
            &connection,
        )
        .unwrap();

        let missions = list_missions(&user_id, &connection).unwrap();

        assert_eq!(missions[0].title, "newer");
        assert_eq!(missions[1].title, "older");
    }
}
