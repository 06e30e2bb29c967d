//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{Error, db::initialize, reward::RewardConfig, timezone::FALLBACK_TIMEZONE};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The XP/gold amounts awarded by the reward calculator.
    pub reward_config: RewardConfig,

    /// The canonical timezone name used for users who have not configured
    /// one, e.g. "America/Sao_Paulo".
    pub fallback_timezone: String,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models and seeding the achievement and shop catalogs.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        reward_config: RewardConfig,
        fallback_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            reward_config,
            fallback_timezone: fallback_timezone.to_owned(),
        })
    }

    /// Acquire the shared database connection.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLock] if the lock is poisoned.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLock
        })
    }
}

#[cfg(test)]
impl AppState {
    /// Create an [AppState] backed by an in-memory database for tests.
    pub fn new_test() -> Self {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        Self::new(connection, RewardConfig::default(), FALLBACK_TIMEZONE)
            .expect("Could not initialize database.")
    }
}
