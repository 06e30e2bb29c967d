//! Database operations for transactions.

use std::ops::RangeInclusive;

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserId,
    transaction::{NewTransaction, Transaction},
};

/// Initialize the transaction table.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            amount REAL NOT NULL,
            kind TEXT NOT NULL,
            category TEXT NOT NULL,
            occurred_on TEXT NOT NULL,
            note TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, occurred_on);",
    )?;

    Ok(())
}

/// Insert a transaction and return it with its generated ID.
pub fn insert_transaction(
    user_id: &UserId,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, kind, category, occurred_on, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, amount, kind, category, occurred_on, note, created_at;",
        )?
        .query_row(
            (
                user_id.as_str(),
                new_transaction.amount,
                new_transaction.kind,
                &new_transaction.category,
                new_transaction.occurred_on,
                &new_transaction.note,
                OffsetDateTime::now_utc(),
            ),
            map_row,
        )?;

    Ok(transaction)
}

/// The total number of transactions the user has ever logged.
pub fn count_transactions(user_id: &UserId, connection: &Connection) -> Result<i64, Error> {
    let count = connection
        .prepare("SELECT COUNT(*) FROM \"transaction\" WHERE user_id = ?1;")?
        .query_row([user_id.as_str()], |row| row.get(0))?;

    Ok(count)
}

/// Retrieve a user's transactions, newest first, optionally bounded by
/// occurrence date (inclusive).
pub fn list_transactions(
    user_id: &UserId,
    from: Option<Date>,
    to: Option<Date>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, kind, category, occurred_on, note, created_at
             FROM \"transaction\"
             WHERE user_id = ?1
                AND (?2 IS NULL OR occurred_on >= ?2)
                AND (?3 IS NULL OR occurred_on <= ?3)
             ORDER BY occurred_on DESC, id DESC;",
        )?
        .query_map((user_id.as_str(), from, to), map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a user's transactions within a date range, e.g. a budget month.
pub fn transactions_in_range(
    user_id: &UserId,
    range: &RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    list_transactions(user_id, Some(*range.start()), Some(*range.end()), connection)
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(row.get::<_, String>(1)?),
        amount: row.get(2)?,
        kind: row.get(3)?,
        category: row.get(4)?,
        occurred_on: row.get(5)?,
        note: row.get(6)?,
        created_at: row.get(7)?,
    })
}
