//! Shop, inventory, and equipment endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    AppState, Error, UserId,
    achievement::{ActionCounters, db::evaluate_triggers},
    reward::db::get_game_state,
    shop::db::{
        count_inventory, list_active_items, list_equipment, list_inventory, owns_item,
        purchase_item, upsert_equipment,
    },
    transaction::db::count_transactions,
};

/// Return the purchasable shop catalog.
pub async fn get_shop_items_endpoint(State(state): State<AppState>) -> Result<Response, Error> {
    let connection = state.connection()?;
    let items = list_active_items(&connection)?;

    Ok(Json(json!({ "items": items })).into_response())
}

/// The body of a purchase request.
#[derive(Debug, Deserialize)]
pub struct BuyForm {
    /// The catalog item to buy.
    pub shop_item_id: i64,
}

/// Buy a shop item with gold, then run the achievement trigger set.
pub async fn buy_item_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Json(form): Json<BuyForm>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let now = OffsetDateTime::now_utc();

    let entry = purchase_item(&user_id, form.shop_item_id, now, &connection)?;

    let game_state = get_game_state(&user_id, &connection)?.unwrap_or_default();
    let counters = ActionCounters {
        transaction_count: count_transactions(&user_id, &connection)?,
        streak_count: game_state.streak_count,
        owned_item_count: count_inventory(&user_id, &connection)?,
        settled_budget_count: 0,
    };
    evaluate_triggers(&user_id, &counters, now, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "inventory": entry, "gold": game_state.gold })),
    )
        .into_response())
}

/// Return the caller's inventory.
pub async fn get_inventory_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let inventory = list_inventory(&user_id, &connection)?;

    Ok(Json(json!({ "inventory": inventory })).into_response())
}

/// Return the caller's equipment loadout.
pub async fn get_loadout_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    let loadout = list_equipment(&user_id, &connection)?;

    Ok(Json(json!({ "loadout": loadout })).into_response())
}

/// The body of an equip request.
#[derive(Debug, Deserialize)]
pub struct EquipForm {
    /// The slot to change, e.g. "helmet".
    pub slot: String,
    /// The owned item to equip, or `None` to clear the slot.
    pub shop_item_id: Option<i64>,
}

/// Equip an owned item into a slot, or clear the slot.
///
/// # Errors
/// Returns [Error::ItemNotOwned] if the item is not in the caller's
/// inventory.
pub async fn equip_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Json(form): Json<EquipForm>,
) -> Result<Response, Error> {
    let connection = state.connection()?;

    if let Some(shop_item_id) = form.shop_item_id
        && !owns_item(&user_id, shop_item_id, &connection)?
    {
        return Err(Error::ItemNotOwned);
    }

    let slot = upsert_equipment(
        &user_id,
        &form.slot,
        form.shop_item_id,
        OffsetDateTime::now_utc(),
        &connection,
    )?;

    Ok(Json(json!({ "loadout": slot })).into_response())
}
