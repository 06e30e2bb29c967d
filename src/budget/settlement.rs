//! The end-of-month budget settlement pass.
//!
//! Settlement is a pure calculation: given the month's budgets, the month's
//! transactions, and the categories already awarded, decide which categories
//! earn the completion bonus. The endpoint is responsible for persisting the
//! award rows and applying the bonus through the reward calculator.

use std::collections::{HashMap, HashSet};

use crate::{budget::Budget, reward::RewardConfig, transaction::Transaction};

/// The outcome of settling one month's budgets.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// Categories that stayed under their limit and had not been awarded
    /// before, in budget order.
    pub awarded_categories: Vec<String>,
    /// The total XP bonus for this settlement.
    pub bonus_xp: i64,
    /// The total gold bonus for this settlement.
    pub bonus_gold: i64,
}

/// Sum the absolute amounts of `transactions` per category.
///
/// Income counts toward "spend" as well: any money movement in a budgeted
/// category consumes the budget.
pub fn spend_by_category(transactions: &[Transaction]) -> HashMap<String, f64> {
    let mut totals = HashMap::new();

    for transaction in transactions {
        *totals.entry(transaction.category.clone()).or_insert(0.0) +=
            transaction.amount.abs();
    }

    totals
}

/// Decide which budget categories earn this month's completion bonus.
///
/// A category is eligible when its spend is at or under the limit and it is
/// not in `previously_awarded`; the bonus scales with the number of eligible
/// categories. Callers pass only budgets and transactions belonging to the
/// month being settled.
pub fn settle_budgets(
    budgets: &[Budget],
    transactions: &[Transaction],
    previously_awarded: &HashSet<String>,
    config: &RewardConfig,
) -> Settlement {
    let totals = spend_by_category(transactions);

    let awarded_categories: Vec<String> = budgets
        .iter()
        .filter(|budget| {
            let spend = totals.get(&budget.category).copied().unwrap_or(0.0);
            spend <= budget.limit_amount && !previously_awarded.contains(&budget.category)
        })
        .map(|budget| budget.category.clone())
        .collect();

    let eligible_count = awarded_categories.len() as i64;

    Settlement {
        awarded_categories,
        bonus_xp: eligible_count * config.budget_bonus_xp,
        bonus_gold: eligible_count * config.budget_bonus_gold,
    }
}

#[cfg(test)]
mod settlement_tests {
    use time::macros::date;

    use crate::{
        UserId,
        transaction::{NewTransaction, TransactionKind},
    };

    use super::*;

    fn budget(id: i64, category: &str, limit_amount: f64) -> Budget {
        Budget {
            id,
            user_id: UserId::new("user-1"),
            month: "2026-07".to_owned(),
            category: category.to_owned(),
            limit_amount,
        }
    }

    fn expense(amount: f64, category: &str) -> Transaction {
        let new_transaction = NewTransaction::new(
            amount,
            TransactionKind::Expense,
            category,
            date!(2026 - 07 - 10),
            None,
        )
        .unwrap();

        Transaction {
            id: 0,
            user_id: UserId::new("user-1"),
            amount: new_transaction.amount,
            kind: new_transaction.kind,
            category: new_transaction.category,
            occurred_on: new_transaction.occurred_on,
            note: None,
            created_at: time::macros::datetime!(2026-07-10 12:00 UTC),
        }
    }

    #[test]
    fn single_category_under_limit_earns_one_bonus() {
        let budgets = [budget(1, "Food", 200.0)];
        let transactions = [expense(150.0, "Food")];

        let settlement = settle_budgets(
            &budgets,
            &transactions,
            &HashSet::new(),
            &RewardConfig::default(),
        );

        assert_eq!(settlement.awarded_categories, vec!["Food"]);
        assert_eq!(settlement.bonus_xp, 300);
        assert_eq!(settlement.bonus_gold, 150);
    }

    #[test]
    fn spend_equal_to_limit_is_still_eligible() {
        let budgets = [budget(1, "Food", 200.0)];
        let transactions = [expense(200.0, "Food")];

        let settlement = settle_budgets(
            &budgets,
            &transactions,
            &HashSet::new(),
            &RewardConfig::default(),
        );

        assert_eq!(settlement.awarded_categories, vec!["Food"]);
    }

    #[test]
    fn overspent_category_earns_nothing() {
        let budgets = [budget(1, "Food", 200.0)];
        let transactions = [expense(150.0, "Food"), expense(60.0, "Food")];

        let settlement = settle_budgets(
            &budgets,
            &transactions,
            &HashSet::new(),
            &RewardConfig::default(),
        );

        assert!(settlement.awarded_categories.is_empty());
        assert_eq!(settlement.bonus_xp, 0);
        assert_eq!(settlement.bonus_gold, 0);
    }

    #[test]
    fn previously_awarded_categories_are_skipped() {
        let budgets = [budget(1, "Food", 200.0), budget(2, "Transport", 100.0)];
        let transactions = [expense(10.0, "Food")];
        let previously_awarded = HashSet::from(["Food".to_owned()]);

        let settlement = settle_budgets(
            &budgets,
            &transactions,
            &previously_awarded,
            &RewardConfig::default(),
        );

        assert_eq!(settlement.awarded_categories, vec!["Transport"]);
        assert_eq!(settlement.bonus_xp, 300);
    }

    #[test]
    fn bonus_scales_with_eligible_count() {
        let budgets = [
            budget(1, "Food", 200.0),
            budget(2, "Transport", 100.0),
            budget(3, "Fun", 50.0),
        ];

        let settlement = settle_budgets(
            &budgets,
            &[],
            &HashSet::new(),
            &RewardConfig::default(),
        );

        assert_eq!(settlement.awarded_categories.len(), 3);
        assert_eq!(settlement.bonus_xp, 900);
        assert_eq!(settlement.bonus_gold, 450);
    }

    #[test]
    fn income_consumes_budget_too() {
        let budgets = [budget(1, "Food", 100.0)];
        let mut refund = expense(80.0, "Food");
        refund.kind = TransactionKind::Income;
        let transactions = [refund, expense(30.0, "Food")];

        let settlement = settle_budgets(
            &budgets,
            &transactions,
            &HashSet::new(),
            &RewardConfig::default(),
        );

        assert!(settlement.awarded_categories.is_empty());
    }
}
