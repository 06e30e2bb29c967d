//! Database operations for budgets and budget awards.

use std::collections::HashSet;

use rusqlite::{Connection, Row};

use crate::{Error, UserId, budget::Budget};

/// Initialize the budget and budget award tables.
pub fn create_budget_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            month TEXT NOT NULL,
            category TEXT NOT NULL,
            limit_amount REAL NOT NULL,
            UNIQUE(user_id, month, category)
        );

        CREATE TABLE IF NOT EXISTS budget_award (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            month TEXT NOT NULL,
            category TEXT NOT NULL,
            UNIQUE(user_id, month, category)
        );",
    )?;

    Ok(())
}

/// Create or replace the budget for a (month, category) pair.
pub fn upsert_budget(
    user_id: &UserId,
    month: &str,
    category: &str,
    limit_amount: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = connection
        .prepare(
            "INSERT INTO budget (user_id, month, category, limit_amount)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, month, category) DO UPDATE SET
                limit_amount = excluded.limit_amount
             RETURNING id, user_id, month, category, limit_amount;",
        )?
        .query_row((user_id.as_str(), month, category, limit_amount), map_row)?;

    Ok(budget)
}

/// Update the limit of an existing budget.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist or belongs to
/// another user.
pub fn update_budget_limit(
    user_id: &UserId,
    budget_id: i64,
    limit_amount: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "UPDATE budget SET limit_amount = ?1
             WHERE id = ?2 AND user_id = ?3
             RETURNING id, user_id, month, category, limit_amount;",
        )?
        .query_row((limit_amount, budget_id, user_id.as_str()), map_row)
        .map_err(|error| error.into())
}

/// Delete a budget.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist or belongs to
/// another user.
pub fn delete_budget(
    user_id: &UserId,
    budget_id: i64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2;",
        (budget_id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The user's budgets for a month.
pub fn list_budgets(
    user_id: &UserId,
    month: &str,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, month, category, limit_amount
             FROM budget WHERE user_id = ?1 AND month = ?2
             ORDER BY category ASC;",
        )?
        .query_map((user_id.as_str(), month), map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// The categories already awarded for a month.
pub fn awarded_categories(
    user_id: &UserId,
    month: &str,
    connection: &Connection,
) -> Result<HashSet<String>, Error> {
    connection
        .prepare("SELECT category FROM budget_award WHERE user_id = ?1 AND month = ?2;")?
        .query_map((user_id.as_str(), month), |row| row.get(0))?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Record award rows for the categories settled this call.
///
/// The unique constraint makes repeated settlement calls safe: an award that
/// already exists is left in place.
pub fn record_awards(
    user_id: &UserId,
    month: &str,
    categories: &[String],
    connection: &Connection,
) -> Result<(), Error> {
    let mut statement = connection.prepare(
        "INSERT INTO budget_award (user_id, month, category)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, month, category) DO NOTHING;",
    )?;

    for category in categories {
        statement.execute((user_id.as_str(), month, category))?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserId::new(row.get::<_, String>(1)?),
        month: row.get(2)?,
        category: row.get(3)?,
        limit_amount: row.get(4)?,
    })
}

#[cfg(test)]
mod budget_db_tests {
    use rusqlite::Connection;

    use crate::{Error, UserId, db::initialize};

    use super::*;

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");

        connection
    }

    #[test]
    fn upsert_overwrites_limit_for_same_month_and_category() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");

        let first = upsert_budget(&user_id, "2026-08", "Food", 200.0, &connection).unwrap();
        let second = upsert_budget(&user_id, "2026-08", "Food", 250.0, &connection).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.limit_amount, 250.0);
        assert_eq!(list_budgets(&user_id, "2026-08", &connection).unwrap().len(), 1);
    }

    #[test]
    fn update_rejects_other_users_budgets() {
        let connection = get_test_connection();
        let owner = UserId::new("user-1");
        let intruder = UserId::new("user-2");

        let budget = upsert_budget(&owner, "2026-08", "Food", 200.0, &connection).unwrap();

        let got = update_budget_limit(&intruder, budget.id, 1.0, &connection);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn delete_rejects_missing_budget() {
        let connection = get_test_connection();

        let got = delete_budget(&UserId::new("user-1"), 42, &connection);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn awards_are_recorded_once() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");
        let categories = vec!["Food".to_owned(), "Transport".to_owned()];

        record_awards(&user_id, "2026-07", &categories, &connection).unwrap();
        record_awards(&user_id, "2026-07", &categories, &connection).unwrap();

        let awarded = awarded_categories(&user_id, "2026-07", &connection).unwrap();

        assert_eq!(awarded.len(), 2);
        assert!(awarded.contains("Food"));
    }
}
