//! Loads progression state, runs the engine and commits the result.
//!
//! Every write to a user's progression row is a compare-and-swap on its
//! version. A commit that loses the race is rolled back and recomputed from a
//! fresh snapshot.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use super::data::{DailyProgress, RadarStats};
use super::decay::{self, Deduction};
use super::engine::{self, CompletionOutcome};
use super::helpers::*;
use crate::data::DBConnection;
use crate::internal_error::{AppError, AppResult};
use crate::tasks::data::Task;
use crate::tasks::helpers::{get_task_from_db, record_task_completion};

pub const MAX_COMMIT_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct PendingCompletion {
    pub snapshot: Snapshot,
    pub task: Task,
    pub today: DailyProgress,
    pub outcome: CompletionOutcome,
}

#[derive(Debug, Clone)]
pub struct PendingDeduction {
    pub snapshot: Snapshot,
    pub deduction: Deduction,
}

pub fn prepare_completion(
    user_id: &str,
    task_id: &str,
    now: DateTime<Utc>,
    db_connection: &Connection,
) -> AppResult<PendingCompletion> {
    let mut snapshot = get_progression_from_db(user_id, db_connection)?.ok_or(AppError::UserNotFound)?;
    let mut task = get_task_from_db(task_id, user_id, db_connection)?.ok_or(AppError::TaskNotFound)?;

    let date = now.date_naive();
    let mut today =
        get_daily_progress_from_db(user_id, date, db_connection)?.unwrap_or_else(|| DailyProgress::new(date));

    let outcome = engine::complete_task(&mut snapshot.state, &mut task, &mut today, now)?;

    Ok(PendingCompletion {
        snapshot,
        task,
        today,
        outcome,
    })
}

/// Writes task, progression and daily record in one transaction.
/// Returns false, with nothing written, if the snapshot went stale.
/// A task deleted since the snapshot was taken rolls everything back.
pub fn commit_completion(
    user_id: &str,
    pending: &PendingCompletion,
    db_connection: &mut Connection,
) -> AppResult<bool> {
    let transaction = db_connection.transaction()?;

    if !update_progression_in_db(
        user_id,
        pending.snapshot.version,
        &pending.snapshot.state,
        &transaction,
    )? {
        return Ok(false);
    }
    if !record_task_completion(&pending.task, &transaction)? {
        return Err(AppError::TaskNotFound);
    }
    upsert_daily_progress(user_id, &pending.today, &transaction)?;

    transaction.commit()?;
    Ok(true)
}

pub fn complete_task(
    db_connection: &DBConnection,
    user_id: &str,
    task_id: &str,
    now: DateTime<Utc>,
) -> AppResult<CompletionOutcome> {
    for attempt in 1..=MAX_COMMIT_ATTEMPTS {
        let pending = prepare_completion(user_id, task_id, now, &*db_connection.lock()?)?;

        if commit_completion(user_id, &pending, &mut *db_connection.lock()?)? {
            let outcome = pending.outcome;
            info!(
                user = user_id,
                task = task_id,
                category = %outcome.category,
                points = outcome.points_earned,
                streak = outcome.current_streak,
                "task completed"
            );
            if let Some(league) = outcome.promoted_to {
                info!(user = user_id, league = %league, "league promotion");
            }
            for badge in &outcome.badges_awarded {
                info!(user = user_id, badge = %badge, "badge awarded");
            }
            return Ok(outcome);
        }

        debug!(user = user_id, attempt, "stale progression snapshot, retrying completion");
    }

    Err(AppError::Contention)
}

pub fn prepare_deduction(
    user_id: &str,
    now: DateTime<Utc>,
    db_connection: &Connection,
) -> AppResult<Option<PendingDeduction>> {
    let mut snapshot = get_progression_from_db(user_id, db_connection)?.ok_or(AppError::UserNotFound)?;

    let today = now.date_naive();
    let history =
        get_daily_progress_between(user_id, decay::lookback_start(today), today, db_connection)?;

    Ok(
        decay::apply_pending_deductions(&mut snapshot.state, &history, now)
            .map(|deduction| PendingDeduction { snapshot, deduction }),
    )
}

pub fn commit_deduction(
    user_id: &str,
    pending: &PendingDeduction,
    db_connection: &Connection,
) -> AppResult<bool> {
    Ok(update_progression_in_db(
        user_id,
        pending.snapshot.version,
        &pending.snapshot.state,
        db_connection,
    )?)
}

/// Deducts points for missed days if due. Safe to call on every read.
pub fn apply_pending_deductions(
    db_connection: &DBConnection,
    user_id: &str,
    now: DateTime<Utc>,
) -> AppResult<Option<Deduction>> {
    for attempt in 1..=MAX_COMMIT_ATTEMPTS {
        let pending = match prepare_deduction(user_id, now, &*db_connection.lock()?)? {
            Some(pending) => pending,
            None => return Ok(None),
        };

        if commit_deduction(user_id, &pending, &*db_connection.lock()?)? {
            info!(
                user = user_id,
                missed_days = pending.deduction.missed_days,
                amount = pending.deduction.amount,
                "points deducted for missed days"
            );
            return Ok(Some(pending.deduction));
        }

        debug!(user = user_id, attempt, "stale progression snapshot, retrying deduction");
    }

    Err(AppError::Contention)
}

pub fn get_radar_stats(
    db_connection: &DBConnection,
    user_id: &str,
    now: DateTime<Utc>,
) -> AppResult<RadarStats> {
    apply_pending_deductions(db_connection, user_id, now)?;

    let snapshot =
        get_progression_from_db(user_id, &*db_connection.lock()?)?.ok_or(AppError::UserNotFound)?;

    Ok(RadarStats::from(&snapshot.state.points))
}
