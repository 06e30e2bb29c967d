//! The gear shop: cosmetic items bought with gold, the inventory that owns
//! them, and the equipment loadout shown on the avatar.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub mod db;
mod endpoints;

pub use endpoints::{
    buy_item_endpoint, equip_endpoint, get_inventory_endpoint, get_loadout_endpoint,
    get_shop_items_endpoint,
};

/// A purchasable cosmetic item in the shop catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    /// The ID of the item.
    pub id: i64,
    /// The display name.
    pub name: String,
    /// The equipment slot the item fits, e.g. "helmet".
    pub slot: String,
    /// The price in gold.
    pub price_gold: i64,
    /// Whether the item is currently purchasable.
    pub is_active: bool,
}

/// An item in a user's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// The ID of the inventory row.
    pub id: i64,
    /// When the item was bought.
    #[serde(with = "time::serde::rfc3339")]
    pub acquired_at: OffsetDateTime,
    /// The catalog item.
    pub item: ShopItem,
}

/// One slot of a user's equipment loadout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlot {
    /// The slot name, e.g. "helmet".
    pub slot: String,
    /// The equipped item, or `None` when the slot is empty.
    pub shop_item_id: Option<i64>,
    /// When the slot was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
