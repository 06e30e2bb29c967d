//! Transaction logging.
//!
//! A transaction is an immutable record of money movement. Logging one is
//! the main game action: it feeds the reward calculator and the achievement
//! trigger set.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, UserId};

pub mod db;
mod create_endpoint;
mod list_endpoint;

pub use create_endpoint::create_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;

/// The direction of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
    /// Money moved between the user's own accounts.
    Transfer,
}

impl TransactionKind {
    /// The kind as the string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "transfer" => Ok(TransactionKind::Transfer),
            other => Err(FromSqlError::Other(
                format!("unknown transaction kind {other}").into(),
            )),
        }
    }
}

/// An event where money was earned, spent, or moved. Never mutated once
/// logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: i64,
    /// The user who logged the transaction.
    pub user_id: UserId,
    /// The amount of money that moved, always positive.
    pub amount: f64,
    /// The direction of the movement.
    pub kind: TransactionKind,
    /// The spending category, e.g. "Food".
    pub category: String,
    /// The local calendar date the money moved.
    pub occurred_on: Date,
    /// A free-text note.
    pub note: Option<String>,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated fields for a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money that moved, always positive.
    pub amount: f64,
    /// The direction of the movement.
    pub kind: TransactionKind,
    /// The spending category.
    pub category: String,
    /// The local calendar date the money moved.
    pub occurred_on: Date,
    /// A free-text note.
    pub note: Option<String>,
}

impl NewTransaction {
    /// Validate a new transaction before anything is written.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] for zero, negative, or non-finite
    /// amounts, and [Error::EmptyCategory] for a blank category.
    pub fn new(
        amount: f64,
        kind: TransactionKind,
        category: &str,
        occurred_on: Date,
        note: Option<String>,
    ) -> Result<Self, Error> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        let category = category.trim();
        if category.is_empty() {
            return Err(Error::EmptyCategory);
        }

        Ok(Self {
            amount,
            kind,
            category: category.to_owned(),
            occurred_on,
            note,
        })
    }
}
