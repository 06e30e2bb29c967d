//! Guildhall is a gamified personal-finance tracker.
//!
//! Logging a transaction, staying under budget, and collecting gear all feed a
//! per-user progression record (experience, level, gold, daily streak). This
//! library provides a JSON REST API on top of a SQLite database: the request
//! handlers validate input, write the triggering record, then run the reward
//! calculator and the achievement trigger set.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod achievement;
mod app_state;
mod budget;
mod db;
mod endpoints;
mod mission;
mod profile;
mod reward;
mod routing;
mod shop;
mod stats;
mod timezone;
mod transaction;
mod user_id;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use reward::RewardConfig;
pub use routing::build_router;
pub use timezone::FALLBACK_TIMEZONE;
pub use user_id::UserId;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request is missing the `x-user-id` header that identifies the
    /// caller.
    #[error("the x-user-id header is required")]
    MissingUserId,

    /// A zero or negative amount was used to create a transaction or budget.
    ///
    /// The direction of money movement is expressed by the transaction kind,
    /// so amounts must always be positive.
    #[error("amounts must be greater than zero")]
    InvalidAmount,

    /// An empty string was used as a spending category.
    #[error("category cannot be empty")]
    EmptyCategory,

    /// A string could not be parsed as a `YYYY-MM` month.
    #[error("\"{0}\" is not a valid month, expected the format YYYY-MM")]
    InvalidMonth(String),

    /// A calendar date could not be derived, e.g. the previous day of
    /// [time::Date::MIN].
    #[error("could not compute a calendar date: {0}")]
    InvalidDate(String),

    /// A string is not a canonical IANA timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A string is not a supported stats window.
    #[error("\"{0}\" is not a valid range, expected 7d or 30d")]
    InvalidRange(String),

    /// The caller tried to create a mission while already at the active
    /// mission cap.
    #[error("at most 3 missions may be active at once")]
    MaxActiveMissions,

    /// The caller tried to buy a shop item that costs more gold than they
    /// hold.
    #[error("not enough gold")]
    InsufficientGold,

    /// The caller tried to equip a shop item they do not own.
    #[error("item is not in the caller's inventory")]
    ItemNotOwned,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource belongs to the caller.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::MissingUserId
            | Error::InvalidAmount
            | Error::EmptyCategory
            | Error::InvalidMonth(_)
            | Error::InvalidDate(_)
            | Error::InvalidTimezone(_)
            | Error::InvalidRange(_)
            | Error::MaxActiveMissions
            | Error::InsufficientGold => StatusCode::BAD_REQUEST,
            Error::ItemNotOwned => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DatabaseLock | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // SQL errors carry table and column names, which the client has no
        // business seeing.
        let message = match &self {
            Error::DatabaseLock | Error::SqlError(_) => "internal server error".to_owned(),
            error => error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
