//! The endpoints for the server.
//!
//! Axum routes and handlers refer to these constants so that the paths are
//! defined in one place.

/// Service liveness.
pub const HEALTH: &str = "/health";
/// The caller's profile and game state.
pub const ME: &str = "/api/me";
/// The caller's profile settings.
pub const ME_SETTINGS: &str = "/api/me/settings";
/// Avatar creation (onboarding).
pub const AVATAR: &str = "/api/avatar";
/// Transaction creation and listing.
pub const TRANSACTIONS: &str = "/api/transactions";
/// Mission creation and listing.
pub const MISSIONS: &str = "/api/missions";
/// Mission completion.
pub const COMPLETE_MISSION: &str = "/api/missions/{mission_id}/complete";
/// The shop catalog.
pub const SHOP_ITEMS: &str = "/api/shop/items";
/// Shop purchases.
pub const SHOP_BUY: &str = "/api/shop/buy";
/// The caller's inventory.
pub const INVENTORY: &str = "/api/inventory";
/// The caller's equipment loadout.
pub const LOADOUT: &str = "/api/loadout";
/// Equipping and unequipping items.
pub const EQUIP: &str = "/api/equip";
/// Budget upserts.
pub const BUDGETS: &str = "/api/budgets";
/// A month's budgets with spend and progress.
pub const CURRENT_BUDGETS: &str = "/api/budgets/current";
/// Updating or deleting a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// End-of-month budget settlement.
pub const FINALIZE_BUDGETS: &str = "/api/budgets/finalize";
/// Spending statistics over a trailing window.
pub const STATS_SUMMARY: &str = "/api/stats/summary";
/// The achievement catalog with the caller's unlock status.
pub const ACHIEVEMENTS: &str = "/api/achievements";
