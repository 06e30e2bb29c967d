//! Database initialization.

use rusqlite::Connection;

use crate::{
    achievement::db::{create_achievement_tables, seed_achievements},
    budget::db::create_budget_tables,
    mission::db::create_mission_table,
    profile::db::create_profile_table,
    reward::db::create_game_state_table,
    shop::db::{create_shop_tables, seed_shop_items},
    transaction::db::create_transaction_table,
};

/// Create all the application tables and seed the static catalogs.
///
/// Runs in one SQL transaction: either the whole schema exists afterwards or
/// none of it does. Safe to call on an already-initialized database.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    create_profile_table(&sql_transaction)?;
    create_game_state_table(&sql_transaction)?;
    create_transaction_table(&sql_transaction)?;
    create_mission_table(&sql_transaction)?;
    create_budget_tables(&sql_transaction)?;
    create_shop_tables(&sql_transaction)?;
    create_achievement_tables(&sql_transaction)?;
    seed_achievements(&sql_transaction)?;
    seed_shop_items(&sql_transaction)?;

    sql_transaction.commit()
}

#[cfg(test)]
mod db_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        initialize(&connection).expect("Could not initialize database.");
        initialize(&connection).expect("Could not re-initialize database.");

        let achievement_count: i64 = connection
            .prepare("SELECT COUNT(*) FROM achievement;")
            .unwrap()
            .query_row([], |row| row.get(0))
            .unwrap();
        assert_eq!(achievement_count, 6);

        let item_count: i64 = connection
            .prepare("SELECT COUNT(*) FROM shop_item;")
            .unwrap()
            .query_row([], |row| row.get(0))
            .unwrap();
        assert_eq!(item_count, 8);
    }
}
