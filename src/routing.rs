//! Ties together the application's routes and request handlers.

use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde_json::json;

use crate::{
    AppState, endpoints,
    achievement::get_achievements_endpoint,
    budget::{
        delete_budget_endpoint, finalize_budgets_endpoint, get_current_budgets_endpoint,
        update_budget_endpoint, upsert_budget_endpoint,
    },
    mission::{complete_mission_endpoint, create_mission_endpoint, get_missions_endpoint},
    profile::{get_me_endpoint, post_avatar_endpoint, update_settings_endpoint},
    shop::{
        buy_item_endpoint, equip_endpoint, get_inventory_endpoint, get_loadout_endpoint,
        get_shop_items_endpoint,
    },
    stats::get_stats_summary_endpoint,
    transaction::{create_transaction_endpoint, list_transactions_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(get_health_endpoint))
        .route(endpoints::ME, get(get_me_endpoint))
        .route(endpoints::ME_SETTINGS, patch(update_settings_endpoint))
        .route(endpoints::AVATAR, post(post_avatar_endpoint))
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
        .route(endpoints::MISSIONS, post(create_mission_endpoint))
        .route(endpoints::MISSIONS, get(get_missions_endpoint))
        .route(endpoints::COMPLETE_MISSION, post(complete_mission_endpoint))
        .route(endpoints::SHOP_ITEMS, get(get_shop_items_endpoint))
        .route(endpoints::SHOP_BUY, post(buy_item_endpoint))
        .route(endpoints::INVENTORY, get(get_inventory_endpoint))
        .route(endpoints::LOADOUT, get(get_loadout_endpoint))
        .route(endpoints::EQUIP, post(equip_endpoint))
        .route(
            endpoints::CURRENT_BUDGETS,
            get(get_current_budgets_endpoint),
        )
        .route(endpoints::BUDGETS, post(upsert_budget_endpoint))
        .route(endpoints::BUDGET, patch(update_budget_endpoint))
        .route(endpoints::BUDGET, delete(delete_budget_endpoint))
        .route(endpoints::FINALIZE_BUDGETS, post(finalize_budgets_endpoint))
        .route(endpoints::STATS_SUMMARY, get(get_stats_summary_endpoint))
        .route(endpoints::ACHIEVEMENTS, get(get_achievements_endpoint))
        .with_state(state)
}

async fn get_health_endpoint() -> Response {
    Json(json!({ "status": "ok", "service": "guildhall" })).into_response()
}
