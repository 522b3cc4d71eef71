use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::data::*;
use crate::internal_error::InternalResult;

pub const PROGRESSION_COLUMNS: &str = "league, current_streak, best_streak, \
     points_intelligence, points_physical, points_social, points_discipline, points_determination, \
     badges, last_task_completion, last_point_deduction, version";

/// Progression state as read, with the row version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: ProgressionState,
    pub version: i64,
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads `PROGRESSION_COLUMNS` starting at column `first`.
pub fn get_snapshot_from_row(row: &Row, first: usize) -> rusqlite::Result<Snapshot> {
    let state = ProgressionState {
        league: row.get(first)?,
        current_streak: row.get(first + 1)?,
        best_streak: row.get(first + 2)?,
        points: CategoryPoints {
            intelligence: row.get(first + 3)?,
            physical: row.get(first + 4)?,
            social: row.get(first + 5)?,
            discipline: row.get(first + 6)?,
            determination: row.get(first + 7)?,
        },
        badges: json_column(row, first + 8)?,
        last_task_completion: row.get(first + 9)?,
        last_point_deduction: row.get(first + 10)?,
    };

    Ok(Snapshot {
        state,
        version: row.get(first + 11)?,
    })
}

pub fn get_progression_from_db(
    user_id: &str,
    db_connection: &Connection,
) -> InternalResult<Option<Snapshot>> {
    let snapshot = db_connection
        .query_row(
            &format!("SELECT {} FROM users WHERE id = (?1)", PROGRESSION_COLUMNS),
            params![user_id],
            |row| get_snapshot_from_row(row, 0),
        )
        .optional()?;

    Ok(snapshot)
}

/// Writes `state` only if the row is still at `expected_version`.
/// Returns false when another writer got there first.
pub fn update_progression_in_db(
    user_id: &str,
    expected_version: i64,
    state: &ProgressionState,
    db_connection: &Connection,
) -> InternalResult<bool> {
    let badges = serde_json::to_string(&state.badges)?;

    let changed = db_connection.execute(
        "UPDATE users SET league = (?1), current_streak = (?2), best_streak = (?3), \
         points_intelligence = (?4), points_physical = (?5), points_social = (?6), \
         points_discipline = (?7), points_determination = (?8), badges = (?9), \
         last_task_completion = (?10), last_point_deduction = (?11), version = version + 1 \
         WHERE id = (?12) AND version = (?13)",
        params![
            state.league,
            state.current_streak,
            state.best_streak,
            state.points.intelligence,
            state.points.physical,
            state.points.social,
            state.points.discipline,
            state.points.determination,
            badges,
            state.last_task_completion,
            state.last_point_deduction,
            user_id,
            expected_version,
        ],
    )?;

    Ok(changed == 1)
}

fn get_daily_progress_from_row(row: &Row) -> rusqlite::Result<DailyProgress> {
    Ok(DailyProgress {
        date: row.get(0)?,
        completed_categories: json_column(row, 1)?,
        points_earned: json_column(row, 2)?,
        streak_day: row.get(3)?,
    })
}

pub fn get_daily_progress_from_db(
    user_id: &str,
    date: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<Option<DailyProgress>> {
    let day = db_connection
        .query_row(
            "SELECT date, completed_categories, points_earned, streak_day FROM daily_progress \
             WHERE user_id = (?1) AND date = (?2)",
            params![user_id, date],
            get_daily_progress_from_row,
        )
        .optional()?;

    Ok(day)
}

/// Records with `from <= date < until`, oldest first.
pub fn get_daily_progress_between(
    user_id: &str,
    from: NaiveDate,
    until: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<Vec<DailyProgress>> {
    let mut statement = db_connection.prepare(
        "SELECT date, completed_categories, points_earned, streak_day FROM daily_progress \
         WHERE user_id = (?1) AND date >= (?2) AND date < (?3) ORDER BY date",
    )?;

    let days = statement
        .query_map(params![user_id, from, until], get_daily_progress_from_row)?
        .collect::<rusqlite::Result<Vec<DailyProgress>>>()?;

    Ok(days)
}

/// Most recent records first.
pub fn get_recent_daily_progress(
    user_id: &str,
    limit: usize,
    db_connection: &Connection,
) -> InternalResult<Vec<DailyProgress>> {
    let mut statement = db_connection.prepare(
        "SELECT date, completed_categories, points_earned, streak_day FROM daily_progress \
         WHERE user_id = (?1) ORDER BY date DESC LIMIT (?2)",
    )?;

    let days = statement
        .query_map(params![user_id, limit as i64], get_daily_progress_from_row)?
        .collect::<rusqlite::Result<Vec<DailyProgress>>>()?;

    Ok(days)
}

pub fn upsert_daily_progress(
    user_id: &str,
    day: &DailyProgress,
    db_connection: &Connection,
) -> InternalResult<()> {
    db_connection.execute(
        "INSERT INTO daily_progress (user_id, date, completed_categories, points_earned, streak_day) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT (user_id, date) DO UPDATE SET \
         completed_categories = excluded.completed_categories, \
         points_earned = excluded.points_earned, \
         streak_day = excluded.streak_day",
        params![
            user_id,
            day.date,
            serde_json::to_string(&day.completed_categories)?,
            serde_json::to_string(&day.points_earned)?,
            day.streak_day,
        ],
    )?;

    Ok(())
}
