//! Monthly category budgets and their end-of-month settlement.

use serde::{Deserialize, Serialize};

use crate::UserId;

pub mod db;
mod endpoints;
pub mod settlement;

pub use endpoints::{
    delete_budget_endpoint, finalize_budgets_endpoint, get_current_budgets_endpoint,
    update_budget_endpoint, upsert_budget_endpoint,
};

/// A spending limit for one (month, category) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: i64,
    /// The user the budget belongs to.
    pub user_id: UserId,
    /// The month the budget applies to, as `YYYY-MM`.
    pub month: String,
    /// The spending category the limit applies to.
    pub category: String,
    /// The spending limit.
    pub limit_amount: f64,
}

/// A budget annotated with the spend recorded against it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    /// The budget row.
    #[serde(flatten)]
    pub budget: Budget,
    /// The absolute spend in the budget's category this month.
    pub spend: f64,
    /// Spend as a whole percentage of the limit, rounded.
    pub progress: i64,
}
