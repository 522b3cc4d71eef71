use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::internal_error::InternalResult;

pub type DBConnection = Arc<Mutex<Connection>>;

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> MessageResponse {
        MessageResponse {
            message: message.to_string(),
        }
    }
}

pub fn init_db(db_connection: &Connection) -> InternalResult<()> {
    db_connection.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            language TEXT NOT NULL,
            created_at TEXT NOT NULL,
            league TEXT NOT NULL,
            current_streak INTEGER NOT NULL DEFAULT 0,
            best_streak INTEGER NOT NULL DEFAULT 0,
            points_intelligence REAL NOT NULL DEFAULT 0,
            points_physical REAL NOT NULL DEFAULT 0,
            points_social REAL NOT NULL DEFAULT 0,
            points_discipline REAL NOT NULL DEFAULT 0,
            points_determination REAL NOT NULL DEFAULT 0,
            badges TEXT NOT NULL DEFAULT '[]',
            last_task_completion TEXT,
            last_point_deduction TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            category TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS task_completions (
            task_id TEXT NOT NULL,
            completed_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS daily_progress (
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,
            completed_categories TEXT NOT NULL,
            points_earned TEXT NOT NULL,
            streak_day INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, date)
        );

        CREATE TABLE IF NOT EXISTS quote_favorites (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            quote TEXT NOT NULL,
            author TEXT NOT NULL,
            saved_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS tasks_by_user ON tasks (user_id, category);
        CREATE INDEX IF NOT EXISTS completions_by_task ON task_completions (task_id);
        CREATE INDEX IF NOT EXISTS favorites_by_user ON quote_favorites (user_id);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
pub fn test_connection() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    init_db(&connection).unwrap();
    connection
}
