//! The reward calculator, the core of the game layer.
//!
//! Every state-changing action funnels through [apply_reward]: a pure
//! function from the caller's current [GameState] and a non-negative XP/gold
//! delta to the next game state. Experience rolls over into levels, gold
//! accumulates without a cap, and the daily streak is advanced by the
//! [evaluate_streak] sub-routine using calendar dates in the user's local
//! timezone.

use serde::{Deserialize, Serialize};
use time::Date;

pub mod db;

/// The XP and gold amounts awarded by the reward calculator.
///
/// The defaults match the original game tuning; the server binary exposes
/// them as command line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardConfig {
    /// XP awarded for logging a transaction.
    pub xp_per_transaction: i64,
    /// Gold awarded for logging a transaction.
    pub gold_per_transaction: i64,
    /// XP required to advance one level.
    pub xp_per_level: i64,
    /// XP awarded per budget category that stayed under its limit.
    pub budget_bonus_xp: i64,
    /// Gold awarded per budget category that stayed under its limit.
    pub budget_bonus_gold: i64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            xp_per_transaction: 50,
            gold_per_transaction: 20,
            xp_per_level: 500,
            budget_bonus_xp: 300,
            budget_bonus_gold: 150,
        }
    }
}

/// A user's progression record.
///
/// One row per user, mutated only by the reward calculator. The experience
/// field always satisfies `0 <= xp < xp_per_level`; overflow from an award is
/// converted into level increments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Experience points towards the next level.
    pub xp: i64,
    /// The current level, starting at 1.
    pub level: i64,
    /// Spendable gold.
    pub gold: i64,
    /// The number of consecutive local calendar days with at least one
    /// logged transaction.
    pub streak_count: u32,
    /// The local calendar date of the most recent streak activity.
    pub streak_last_date: Option<Date>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            gold: 0,
            streak_count: 0,
            streak_last_date: None,
        }
    }
}

/// Add an XP and gold award to `state`, rolling surplus XP over into levels.
///
/// `xp_delta` and `gold_delta` must be non-negative. Streak fields are left
/// untouched; the transaction path updates them via [apply_transaction_reward].
pub fn apply_reward(
    state: &GameState,
    xp_delta: i64,
    gold_delta: i64,
    config: &RewardConfig,
) -> GameState {
    let total_xp = state.xp + xp_delta;
    let levels_gained = total_xp / config.xp_per_level;

    GameState {
        xp: total_xp % config.xp_per_level,
        level: state.level + levels_gained,
        gold: state.gold + gold_delta,
        streak_count: state.streak_count,
        streak_last_date: state.streak_last_date,
    }
}

/// The next game state after logging a transaction on `today`: the
/// per-transaction XP/gold award plus a streak update.
pub fn apply_transaction_reward(
    state: &GameState,
    today: Date,
    yesterday: Date,
    config: &RewardConfig,
) -> GameState {
    let streak_count = evaluate_streak(state.streak_last_date, today, yesterday, state.streak_count);

    let mut next = apply_reward(
        state,
        config.xp_per_transaction,
        config.gold_per_transaction,
        config,
    );
    next.streak_count = streak_count;
    next.streak_last_date = Some(today);

    next
}

/// Decide the new streak count given the date of the last streak activity.
///
/// Rules, in priority order:
/// 1. activity already recorded today: the count is unchanged, so multiple
///    logs on the same day do not inflate the streak;
/// 2. last activity was yesterday: the streak continues and the count goes
///    up by one;
/// 3. otherwise (a gap of two or more days, or no activity at all): the
///    streak restarts at 1.
pub fn evaluate_streak(
    last_date: Option<Date>,
    today: Date,
    yesterday: Date,
    current_count: u32,
) -> u32 {
    match last_date {
        Some(last) if last == today => current_count,
        Some(last) if last == yesterday => current_count + 1,
        _ => 1,
    }
}
