use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use std::collections::HashMap;

use super::data::{Category, DailyProgress, ProgressionState};

/// How many days before today are inspected.
pub const LOOKBACK_DAYS: u32 = 7;
pub const MISSED_DAYS_BEFORE_DEDUCTION: u32 = 2;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Deduction {
    pub missed_days: u32,
    pub amount: f64,
}

/// First day (inclusive) of the window that `count_missed_days` looks at.
pub fn lookback_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(LOOKBACK_DAYS as i64)
}

/// Counts consecutive days, walking back from yesterday, without all five
/// categories completed. Stops at the first full day or after the lookback.
pub fn count_missed_days(history: &[DailyProgress], today: NaiveDate) -> u32 {
    let by_date: HashMap<NaiveDate, &DailyProgress> =
        history.iter().map(|day| (day.date, day)).collect();

    let mut missed = 0;
    let mut check_date = today - Duration::days(1);

    while missed < LOOKBACK_DAYS {
        match by_date.get(&check_date) {
            Some(day) if day.all_categories_completed() => break,
            _ => missed += 1,
        }
        check_date = check_date - Duration::days(1);
    }

    missed
}

/// Works out whether a deduction is due, without touching the state.
pub fn pending_deduction(
    state: &ProgressionState,
    history: &[DailyProgress],
    today: NaiveDate,
) -> Option<Deduction> {
    let missed_days = count_missed_days(history, today);
    if missed_days < MISSED_DAYS_BEFORE_DEDUCTION {
        return None;
    }

    // Already deducted inside this run of missed days.
    if let Some(last) = state.last_point_deduction {
        let days_since = (today - last.date_naive()).num_days();
        if days_since < missed_days as i64 {
            return None;
        }
    }

    Some(Deduction {
        missed_days,
        amount: state.league.multipliers().decay,
    })
}

pub fn apply_deduction(state: &mut ProgressionState, deduction: &Deduction, now: DateTime<Utc>) {
    for category in Category::ALL {
        let balance = state.points.get_mut(category);
        *balance = (*balance - deduction.amount).max(0.0);
    }
    state.current_streak = 0;
    state.last_point_deduction = Some(now);
}

/// Returns the deduction that was applied, if any. Idempotent within one
/// missed-day window.
pub fn apply_pending_deductions(
    state: &mut ProgressionState,
    history: &[DailyProgress],
    now: DateTime<Utc>,
) -> Option<Deduction> {
    let deduction = pending_deduction(state, history, now.date_naive())?;
    apply_deduction(state, &deduction, now);
    Some(deduction)
}
