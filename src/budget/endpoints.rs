//! Budget endpoints: CRUD for monthly limits plus the settlement pass.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    AppState, Error, UserId,
    achievement::{ActionCounters, db::evaluate_triggers},
    budget::{
        BudgetProgress,
        db::{
            awarded_categories, delete_budget, list_budgets, record_awards, update_budget_limit,
            upsert_budget,
        },
        settlement::{settle_budgets, spend_by_category},
    },
    profile::resolve_timezone,
    reward::db::{get_game_state, grant_bonus_reward},
    shop::db::count_inventory,
    timezone::{current_month, month_range, previous_month},
    transaction::db::{count_transactions, transactions_in_range},
    user_id::TimezoneHeader,
};

/// Optional month override for the budgets view.
#[derive(Debug, Default, Deserialize)]
pub struct CurrentBudgetsParams {
    /// The month to show, as `YYYY-MM`; defaults to the current month in the
    /// caller's timezone.
    pub month: Option<String>,
}

/// Return the caller's budgets for a month, annotated with spend so far.
pub async fn get_current_budgets_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    TimezoneHeader(header_timezone): TimezoneHeader,
    Query(params): Query<CurrentBudgetsParams>,
) -> Result<Response, Error> {
    let connection = state.connection()?;

    let timezone = resolve_timezone(
        &user_id,
        header_timezone.as_deref(),
        &state.fallback_timezone,
        &connection,
    )?;
    let month = match params.month {
        Some(month) => month,
        None => current_month(&timezone, OffsetDateTime::now_utc())?,
    };
    let range = month_range(&month)?;

    let budgets = list_budgets(&user_id, &month, &connection)?;
    let transactions = transactions_in_range(&user_id, &range, &connection)?;
    let totals = spend_by_category(&transactions);

    let budgets: Vec<BudgetProgress> = budgets
        .into_iter()
        .map(|budget| {
            let spend = totals.get(&budget.category).copied().unwrap_or(0.0);
            let progress = if budget.limit_amount > 0.0 {
                (spend / budget.limit_amount * 100.0).round() as i64
            } else {
                0
            };

            BudgetProgress {
                budget,
                spend,
                progress,
            }
        })
        .collect();

    Ok(Json(json!({ "month": month, "budgets": budgets })).into_response())
}

/// The body of a budget upsert request.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    /// The month the budget applies to, as `YYYY-MM`.
    pub month: String,
    /// The spending category.
    pub category: String,
    /// The spending limit.
    pub limit_amount: f64,
}

/// Create or replace a budget for a (month, category) pair.
pub async fn upsert_budget_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Json(form): Json<BudgetForm>,
) -> Result<Response, Error> {
    if !form.limit_amount.is_finite() || form.limit_amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }
    let category = form.category.trim();
    if category.is_empty() {
        return Err(Error::EmptyCategory);
    }
    // Rejects malformed months before they end up as unreachable rows.
    month_range(&form.month)?;

    let connection = state.connection()?;
    let budget = upsert_budget(&user_id, &form.month, category, form.limit_amount, &connection)?;

    Ok((StatusCode::CREATED, Json(json!({ "budget": budget }))).into_response())
}

/// The body of a budget limit update.
#[derive(Debug, Deserialize)]
pub struct BudgetLimitForm {
    /// The new spending limit.
    pub limit_amount: f64,
}

/// Update the limit of an existing budget.
pub async fn update_budget_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Path(budget_id): Path<i64>,
    Json(form): Json<BudgetLimitForm>,
) -> Result<Response, Error> {
    if !form.limit_amount.is_finite() || form.limit_amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let connection = state.connection()?;
    let budget = update_budget_limit(&user_id, budget_id, form.limit_amount, &connection)?;

    Ok(Json(json!({ "budget": budget })).into_response())
}

/// Delete a budget.
pub async fn delete_budget_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    Path(budget_id): Path<i64>,
) -> Result<Response, Error> {
    let connection = state.connection()?;
    delete_budget(&user_id, budget_id, &connection)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// The body of a settlement request.
#[derive(Debug, Default, Deserialize)]
pub struct FinalizeForm {
    /// The month to settle, as `YYYY-MM`; defaults to the previous month in
    /// the caller's timezone.
    pub month: Option<String>,
}

/// Settle a month's budgets: award the completion bonus for every category
/// that stayed under its limit and has not been awarded before.
pub async fn finalize_budgets_endpoint(
    State(state): State<AppState>,
    user_id: UserId,
    TimezoneHeader(header_timezone): TimezoneHeader,
    form: Option<Json<FinalizeForm>>,
) -> Result<Response, Error> {
    let Json(form) = form.unwrap_or_default();
    let connection = state.connection()?;
    let now = OffsetDateTime::now_utc();

    let timezone = resolve_timezone(
        &user_id,
        header_timezone.as_deref(),
        &state.fallback_timezone,
        &connection,
    )?;
    let month = match form.month {
        Some(month) => month,
        None => previous_month(&timezone, now)?,
    };
    let range = month_range(&month)?;

    let budgets = list_budgets(&user_id, &month, &connection)?;
    let transactions = transactions_in_range(&user_id, &range, &connection)?;
    let previously_awarded = awarded_categories(&user_id, &month, &connection)?;

    let settlement = settle_budgets(
        &budgets,
        &transactions,
        &previously_awarded,
        &state.reward_config,
    );

    if !settlement.awarded_categories.is_empty() {
        record_awards(&user_id, &month, &settlement.awarded_categories, &connection)?;
        grant_bonus_reward(
            &user_id,
            settlement.bonus_xp,
            settlement.bonus_gold,
            &state.reward_config,
            &connection,
        )?;
    }

    let game_state = get_game_state(&user_id, &connection)?.unwrap_or_default();
    let counters = ActionCounters {
        transaction_count: count_transactions(&user_id, &connection)?,
        streak_count: game_state.streak_count,
        owned_item_count: count_inventory(&user_id, &connection)?,
        settled_budget_count: settlement.awarded_categories.len() as i64,
    };
    evaluate_triggers(&user_id, &counters, now, &connection)?;

    Ok(Json(json!({
        "month": month,
        "awarded": settlement.awarded_categories.len(),
    }))
    .into_response())
}
