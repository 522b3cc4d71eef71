use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::data::*;
use crate::internal_error::{AppError, AppResult, InternalResult};
use crate::progression::data::ProgressionState;
use crate::progression::helpers::{get_snapshot_from_row, PROGRESSION_COLUMNS};
use crate::progression::leaderboard::Contender;

fn get_user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        language: row.get(3)?,
        created_at: row.get(4)?,
        progression: get_snapshot_from_row(row, 5)?.state,
    })
}

pub fn get_user_from_db(user_id: &str, db_connection: &Connection) -> InternalResult<Option<User>> {
    let user = db_connection
        .query_row(
            &format!(
                "SELECT id, username, email, language, created_at, {} FROM users WHERE id = (?1)",
                PROGRESSION_COLUMNS
            ),
            params![user_id],
            get_user_from_row,
        )
        .optional()?;

    Ok(user)
}

pub fn user_exists(user_id: &str, db_connection: &Connection) -> InternalResult<bool> {
    let found = db_connection
        .query_row(
            "SELECT 1 FROM users WHERE id = (?1)",
            params![user_id],
            |_| Ok(()),
        )
        .optional()?;

    Ok(found.is_some())
}

fn column_value_taken(column: &str, value: &str, db_connection: &Connection) -> InternalResult<bool> {
    let found = db_connection
        .query_row(
            &format!("SELECT 1 FROM users WHERE {} = (?1)", column),
            params![value],
            |_| Ok(()),
        )
        .optional()?;

    Ok(found.is_some())
}

pub fn add_user_to_db(
    request: RegisterRequest,
    now: DateTime<Utc>,
    db_connection: &Connection,
) -> AppResult<User> {
    request.validate()?;

    if column_value_taken("username", &request.username, db_connection)? {
        return Err(AppError::UsernameTaken);
    }
    if column_value_taken("email", &request.email, db_connection)? {
        return Err(AppError::EmailTaken);
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: request.username,
        email: request.email,
        language: request.language,
        created_at: now,
        progression: ProgressionState::default(),
    };

    db_connection.execute(
        "INSERT INTO users (id, username, email, language, created_at, league) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.username,
            user.email,
            user.language,
            user.created_at,
            user.progression.league,
        ],
    )?;

    Ok(user)
}

pub fn get_contenders_from_db(db_connection: &Connection) -> InternalResult<Vec<Contender>> {
    let mut statement = db_connection.prepare(&format!(
        "SELECT username, language, {} FROM users ORDER BY rowid",
        PROGRESSION_COLUMNS
    ))?;

    let contenders = statement
        .query_map(params![], |row| {
            let state = get_snapshot_from_row(row, 2)?.state;

            Ok(Contender {
                username: row.get(0)?,
                language: row.get(1)?,
                league: state.league,
                current_streak: state.current_streak,
                points: state.points,
            })
        })?
        .collect::<rusqlite::Result<Vec<Contender>>>()?;

    Ok(contenders)
}

#[cfg(test)]
pub fn register_test_user(username: &str, db_connection: &Connection) -> User {
    add_user_to_db(
        RegisterRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            language: Language::English,
        },
        Utc::now(),
        db_connection,
    )
    .unwrap()
}
