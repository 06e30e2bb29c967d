//! The transaction logging endpoint, the main entry into the reward
//! pipeline.
//!
//! Validation happens before anything is written. After the transaction row
//! is inserted, the reward and achievement writes are separate steps: a
//! persistence failure there surfaces to the caller but does not roll back
//! the already-committed transaction row.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, UserId,
    achievement::{ActionCounters, db::evaluate_triggers},
    profile::resolve_timezone,
    reward::db::grant_transaction_reward,
    shop::db::count_inventory,
    timezone::today_and_yesterday,
    transaction::{NewTransaction, TransactionKind, db},
    user_id::TimezoneHeader,
};

/// The body of a transaction logging request.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The amount of money that moved, always positive.
    pub amount: f64,
    /// The direction of the movement.
    pub kind: TransactionKind,
    /// The spending category.
    pub category: String,
    /// The local calendar date the money moved; defaults to today in the
    /// caller's timezone.
    pub occurred_on: Option<Date>,
    /// A free-text note.
    pub note: Option<String>,
}

/// Log a transaction, award the per-transaction reward, and run the
/// achievement trigger set.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    TimezoneHeader(header_timezone): TimezoneHeader,
    Json(form): Json<TransactionForm>,
) -> Result<Response, Error> {
    let connection = state.connection()?;

    let timezone = resolve_timezone(
        &user_id,
        header_timezone.as_deref(),
        &state.fallback_timezone,
        &connection,
    )?;
    let now = OffsetDateTime::now_utc();
    let (today, yesterday) = today_and_yesterday(&timezone, now)?;

    let new_transaction = NewTransaction::new(
        form.amount,
        form.kind,
        &form.category,
        form.occurred_on.unwrap_or(today),
        form.note,
    )?;

    let transaction = db::insert_transaction(&user_id, new_transaction, &connection)?;

    let game_state =
        grant_transaction_reward(&user_id, today, yesterday, &state.reward_config, &connection)?;

    let counters = ActionCounters {
        transaction_count: db::count_transactions(&user_id, &connection)?,
        streak_count: game_state.streak_count,
        owned_item_count: count_inventory(&user_id, &connection)?,
        settled_budget_count: 0,
    };
    evaluate_triggers(&user_id, &counters, now, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "transaction": transaction, "game_state": game_state })),
    )
        .into_response())
}
