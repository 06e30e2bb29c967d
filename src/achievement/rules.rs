//! The achievement trigger rule table.
//!
//! One ordered list of predicates over post-action counters, evaluated
//! uniformly after every state-changing action. Keeping the rules in one
//! place means a new trigger is a one-line addition rather than another
//! inline check at a call site.

/// The counters describing the caller's state after an action completed.
///
/// Counters that do not apply to the triggering action are zero, which no
/// rule can match on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionCounters {
    /// Total transactions ever logged by the user.
    pub transaction_count: i64,
    /// The streak count after the action.
    pub streak_count: u32,
    /// Total cosmetic items in the user's inventory.
    pub owned_item_count: i64,
    /// Budget categories awarded in the current settlement call.
    pub settled_budget_count: i64,
}

struct TriggerRule {
    code: &'static str,
    unlocks: fn(&ActionCounters) -> bool,
}

const RULES: &[TriggerRule] = &[
    TriggerRule {
        code: "first-log",
        unlocks: |counters| counters.transaction_count == 1,
    },
    TriggerRule {
        code: "steady-hand",
        unlocks: |counters| counters.streak_count >= 3,
    },
    TriggerRule {
        code: "streak-7",
        unlocks: |counters| counters.streak_count >= 7,
    },
    TriggerRule {
        code: "guild-treasurer",
        unlocks: |counters| counters.transaction_count >= 50,
    },
    TriggerRule {
        code: "armory-collector",
        unlocks: |counters| counters.owned_item_count >= 5,
    },
    TriggerRule {
        code: "budget-keeper",
        unlocks: |counters| counters.settled_budget_count >= 3,
    },
];

/// The codes of all achievements whose condition holds for `counters`, in
/// rule order.
pub fn triggered_codes(counters: &ActionCounters) -> Vec<&'static str> {
    RULES
        .iter()
        .filter(|rule| (rule.unlocks)(counters))
        .map(|rule| rule.code)
        .collect()
}

#[cfg(test)]
mod trigger_rule_tests {
    use super::*;

    #[test]
    fn no_counters_triggers_nothing() {
        assert!(triggered_codes(&ActionCounters::default()).is_empty());
    }

    #[test]
    fn first_transaction_triggers_first_log_only() {
        let counters = ActionCounters {
            transaction_count: 1,
            streak_count: 1,
            ..ActionCounters::default()
        };

        assert_eq!(triggered_codes(&counters), vec!["first-log"]);
    }

    #[test]
    fn second_transaction_does_not_trigger_first_log() {
        let counters = ActionCounters {
            transaction_count: 2,
            streak_count: 1,
            ..ActionCounters::default()
        };

        assert!(triggered_codes(&counters).is_empty());
    }

    #[test]
    fn streak_thresholds() {
        let at_three = ActionCounters {
            transaction_count: 10,
            streak_count: 3,
            ..ActionCounters::default()
        };
        let at_seven = ActionCounters {
            transaction_count: 10,
            streak_count: 7,
            ..ActionCounters::default()
        };

        assert_eq!(triggered_codes(&at_three), vec!["steady-hand"]);
        assert_eq!(triggered_codes(&at_seven), vec!["steady-hand", "streak-7"]);
    }

    #[test]
    fn fiftieth_transaction_triggers_treasurer() {
        let at_49 = ActionCounters {
            transaction_count: 49,
            streak_count: 1,
            ..ActionCounters::default()
        };
        let at_50 = ActionCounters {
            transaction_count: 50,
            streak_count: 1,
            ..ActionCounters::default()
        };

        assert!(triggered_codes(&at_49).is_empty());
        assert_eq!(triggered_codes(&at_50), vec!["guild-treasurer"]);
    }

    #[test]
    fn five_owned_items_trigger_collector() {
        let counters = ActionCounters {
            owned_item_count: 5,
            ..ActionCounters::default()
        };

        assert_eq!(triggered_codes(&counters), vec!["armory-collector"]);
    }

    #[test]
    fn three_settled_budgets_trigger_budget_keeper() {
        let two = ActionCounters {
            settled_budget_count: 2,
            ..ActionCounters::default()
        };
        let three = ActionCounters {
            settled_budget_count: 3,
            ..ActionCounters::default()
        };

        assert!(triggered_codes(&two).is_empty());
        assert_eq!(triggered_codes(&three), vec!["budget-keeper"]);
    }
}
