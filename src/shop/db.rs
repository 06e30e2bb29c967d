//! Database operations for the shop, inventory, and equipment.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserId,
    shop::{EquipmentSlot, InventoryEntry, ShopItem},
};

/// Initialize the shop, inventory, and equipment tables.
pub fn create_shop_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS shop_item (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            slot TEXT NOT NULL,
            price_gold INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS inventory (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            shop_item_id INTEGER NOT NULL REFERENCES shop_item(id),
            acquired_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_inventory_user ON inventory(user_id);

        CREATE TABLE IF NOT EXISTS equipment (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            slot TEXT NOT NULL,
            shop_item_id INTEGER REFERENCES shop_item(id),
            updated_at TEXT NOT NULL,
            UNIQUE(user_id, slot)
        );",
    )?;

    Ok(())
}

/// Seed the static shop catalog. Re-running the seed is a no-op.
pub fn seed_shop_items(connection: &Connection) -> Result<(), rusqlite::Error> {
    let catalog = [
        ("Leather Cap", "helmet", 50),
        ("Iron Helm", "helmet", 220),
        ("Padded Vest", "armor", 120),
        ("Mithril Hauberk", "armor", 480),
        ("Walking Stick", "weapon", 80),
        ("Rune Axe", "weapon", 400),
        ("Copper Charm", "trinket", 60),
        ("Cave Bat", "pet", 350),
    ];

    let mut statement = connection.prepare(
        "INSERT INTO shop_item (name, slot, price_gold)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(name) DO NOTHING;",
    )?;

    for (name, slot, price_gold) in catalog {
        statement.execute((name, slot, price_gold))?;
    }

    Ok(())
}

/// The items currently purchasable, cheapest first.
pub fn list_active_items(connection: &Connection) -> Result<Vec<ShopItem>, Error> {
    connection
        .prepare(
            "SELECT id, name, slot, price_gold, is_active
             FROM shop_item WHERE is_active = 1
             ORDER BY price_gold ASC, id ASC;",
        )?
        .query_map([], map_item_row)?
        .map(|maybe_item| maybe_item.map_err(|error| error.into()))
        .collect()
}

/// Buy a shop item: check the price against the caller's gold, insert the
/// inventory row, and deduct the gold, all inside one SQL transaction.
///
/// # Errors
/// - [Error::NotFound] if the item does not exist or is inactive.
/// - [Error::InsufficientGold] if the caller cannot afford it.
pub fn purchase_item(
    user_id: &UserId,
    shop_item_id: i64,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<InventoryEntry, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let item = sql_transaction
        .prepare(
            "SELECT id, name, slot, price_gold, is_active
             FROM shop_item WHERE id = ?1 AND is_active = 1;",
        )?
        .query_row([shop_item_id], map_item_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => error.into(),
        })?;

    let gold = match sql_transaction
        .prepare("SELECT gold FROM game_state WHERE user_id = ?1;")?
        .query_row([user_id.as_str()], |row| row.get::<_, i64>(0))
    {
        Ok(gold) => gold,
        // No game state yet means no gold earned yet.
        Err(rusqlite::Error::QueryReturnedNoRows) => 0,
        Err(error) => return Err(error.into()),
    };

    if gold < item.price_gold {
        return Err(Error::InsufficientGold);
    }

    let entry_id: i64 = sql_transaction
        .prepare(
            "INSERT INTO inventory (user_id, shop_item_id, acquired_at)
             VALUES (?1, ?2, ?3)
             RETURNING id;",
        )?
        .query_row((user_id.as_str(), shop_item_id, now), |row| row.get(0))?;

    sql_transaction.execute(
        "UPDATE game_state SET gold = gold - ?1 WHERE user_id = ?2;",
        (item.price_gold, user_id.as_str()),
    )?;

    sql_transaction.commit()?;

    Ok(InventoryEntry {
        id: entry_id,
        acquired_at: now,
        item,
    })
}

/// The number of cosmetic items the user owns.
pub fn count_inventory(user_id: &UserId, connection: &Connection) -> Result<i64, Error> {
    let count = connection
        .prepare("SELECT COUNT(*) FROM inventory WHERE user_id = ?1;")?
        .query_row([user_id.as_str()], |row| row.get(0))?;

    Ok(count)
}

/// Whether the user owns at least one copy of the item.
pub fn owns_item(
    user_id: &UserId,
    shop_item_id: i64,
    connection: &Connection,
) -> Result<bool, Error> {
    let count: i64 = connection
        .prepare("SELECT COUNT(*) FROM inventory WHERE user_id = ?1 AND shop_item_id = ?2;")?
        .query_row((user_id.as_str(), shop_item_id), |row| row.get(0))?;

    Ok(count > 0)
}

/// The user's inventory with catalog details, newest first.
pub fn list_inventory(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<InventoryEntry>, Error> {
    connection
        .prepare(
            "SELECT i.id, i.acquired_at, s.id, s.name, s.slot, s.price_gold, s.is_active
             FROM inventory i
             JOIN shop_item s ON s.id = i.shop_item_id
             WHERE i.user_id = ?1
             ORDER BY i.id DESC;",
        )?
        .query_map([user_id.as_str()], |row| {
            Ok(InventoryEntry {
                id: row.get(0)?,
                acquired_at: row.get(1)?,
                item: ShopItem {
                    id: row.get(2)?,
                    name: row.get(3)?,
                    slot: row.get(4)?,
                    price_gold: row.get(5)?,
                    is_active: row.get(6)?,
                },
            })
        })?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Equip an owned item into a slot, or clear the slot with `None`.
pub fn upsert_equipment(
    user_id: &UserId,
    slot: &str,
    shop_item_id: Option<i64>,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<EquipmentSlot, Error> {
    connection.execute(
        "INSERT INTO equipment (user_id, slot, shop_item_id, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, slot) DO UPDATE SET
            shop_item_id = excluded.shop_item_id,
            updated_at = excluded.updated_at;",
        (user_id.as_str(), slot, shop_item_id, now),
    )?;

    Ok(EquipmentSlot {
        slot: slot.to_owned(),
        shop_item_id,
        updated_at: now,
    })
}

/// The user's equipment loadout.
pub fn list_equipment(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<EquipmentSlot>, Error> {
    connection
        .prepare(
            "SELECT slot, shop_item_id, updated_at
             FROM equipment WHERE user_id = ?1
             ORDER BY slot ASC;",
        )?
        .query_map([user_id.as_str()], |row| {
            Ok(EquipmentSlot {
                slot: row.get(0)?,
                shop_item_id: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?
        .map(|maybe_slot| maybe_slot.map_err(|error| error.into()))
        .collect()
}

fn map_item_row(row: &Row) -> Result<ShopItem, rusqlite::Error> {
    Ok(ShopItem {
        id: row.get(0)?,
        name: row.get(1)?,
        slot: row.get(2)?,
        price_gold: row.get(3)?,
        is_active: row.get(4)?,
    })
}

#[cfg(test)]
mod shop_db_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        UserId,
        db::initialize,
        reward::{RewardConfig, db::grant_bonus_reward},
    };

    use super::*;

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");

        connection
    }

    fn cheapest_item(connection: &Connection) -> ShopItem {
        list_active_items(connection).unwrap().remove(0)
    }

    #[test]
    fn catalog_is_seeded() {
        let connection = get_test_connection();

        let items = list_active_items(&connection).unwrap();

        assert_eq!(items.len(), 8);
        assert!(items.windows(2).all(|w| w[0].price_gold <= w[1].price_gold));
    }

    #[test]
    fn purchase_rejects_poor_buyers_without_inserting() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");
        let item = cheapest_item(&connection);

        let got = purchase_item(
            &user_id,
            item.id,
            datetime!(2026-08-30 10:00 UTC),
            &connection,
        );

        assert_eq!(got, Err(Error::InsufficientGold));
        assert_eq!(count_inventory(&user_id, &connection).unwrap(), 0);
    }

    #[test]
    fn purchase_deducts_gold_and_records_ownership() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");
        let config = RewardConfig::default();
        let item = cheapest_item(&connection);

        grant_bonus_reward(&user_id, 0, 300, &config, &connection).unwrap();
        let entry = purchase_item(
            &user_id,
            item.id,
            datetime!(2026-08-30 10:00 UTC),
            &connection,
        )
        .unwrap();

        assert_eq!(entry.item, item);
        assert!(owns_item(&user_id, item.id, &connection).unwrap());

        let gold: i64 = connection
            .query_row(
                "SELECT gold FROM game_state WHERE user_id = ?1;",
                [user_id.as_str()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(gold, 300 - item.price_gold);
    }

    #[test]
    fn unknown_item_is_not_found() {
        let connection = get_test_connection();

        let got = purchase_item(
            &UserId::new("user-1"),
            9999,
            datetime!(2026-08-30 10:00 UTC),
            &connection,
        );

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn equipment_upsert_replaces_slot() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");
        let now = datetime!(2026-08-30 10:00 UTC);

        upsert_equipment(&user_id, "helmet", Some(1), now, &connection).unwrap();
        upsert_equipment(&user_id, "helmet", Some(2), now, &connection).unwrap();
        upsert_equipment(&user_id, "weapon", None, now, &connection).unwrap();

        let loadout = list_equipment(&user_id, &connection).unwrap();

        assert_eq!(loadout.len(), 2);
        assert_eq!(loadout[0].slot, "helmet");
        assert_eq!(loadout[0].shop_item_id, Some(2));
        assert_eq!(loadout[1].slot, "weapon");
        assert_eq!(loadout[1].shop_item_id, None);
    }
}
