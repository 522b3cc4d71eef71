use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use std::collections::HashMap;

use super::data::*;
use crate::internal_error::{AppError, AppResult, InternalError, InternalResult};
use crate::progression::data::Category;

const MAX_LISTED_TASKS: usize = 100;

fn get_task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
        is_completed: row.get(6)?,
        completed_at: row.get(7)?,
        completion_dates: vec![],
    })
}

fn get_completion_dates(
    task_id: &str,
    db_connection: &Connection,
) -> InternalResult<Vec<DateTime<Utc>>> {
    let mut statement = db_connection.prepare(
        "SELECT completed_at FROM task_completions WHERE task_id = (?1) ORDER BY completed_at",
    )?;

    let dates = statement
        .query_map(params![task_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<DateTime<Utc>>>>()?;

    Ok(dates)
}

/// Only finds the task when it belongs to `user_id`.
pub fn get_task_from_db(
    task_id: &str,
    user_id: &str,
    db_connection: &Connection,
) -> InternalResult<Option<Task>> {
    let task = db_connection
        .query_row(
            "SELECT id, user_id, category, title, description, created_at, is_completed, completed_at \
             FROM tasks WHERE id = (?1) AND user_id = (?2)",
            params![task_id, user_id],
            get_task_from_row,
        )
        .optional()?;

    match task {
        Some(mut task) => {
            task.completion_dates = get_completion_dates(&task.id, db_connection)?;
            Ok(Some(task))
        }
        None => Ok(None),
    }
}

pub fn get_tasks_from_db(user_id: &str, db_connection: &Connection) -> InternalResult<Vec<Task>> {
    let mut tasks_statement = db_connection.prepare(
        "SELECT id, user_id, category, title, description, created_at, is_completed, completed_at \
         FROM tasks WHERE user_id = (?1) ORDER BY rowid LIMIT (?2)",
    )?;

    let mut tasks = tasks_statement
        .query_map(params![user_id, MAX_LISTED_TASKS as i64], get_task_from_row)?
        .collect::<rusqlite::Result<Vec<Task>>>()?;

    let mut completions_statement = db_connection.prepare(
        "SELECT c.task_id, c.completed_at FROM task_completions c \
         JOIN tasks t ON t.id = c.task_id WHERE t.user_id = (?1) ORDER BY c.completed_at",
    )?;

    let mut completion_map: HashMap<TaskID, Vec<DateTime<Utc>>> = HashMap::new();
    let completion_rows = completions_statement.query_map(params![user_id], |row| {
        Ok((row.get::<usize, TaskID>(0)?, row.get::<usize, DateTime<Utc>>(1)?))
    })?;

    for row_result in completion_rows {
        let (task_id, completed_at) = row_result?;
        completion_map.entry(task_id).or_default().push(completed_at);
    }

    for task in tasks.iter_mut() {
        if let Some(dates) = completion_map.remove(&task.id) {
            task.completion_dates = dates;
        }
    }

    Ok(tasks)
}

pub fn count_tasks_in_category(
    user_id: &str,
    category: Category,
    db_connection: &Connection,
) -> InternalResult<usize> {
    let count: i64 = db_connection.query_row(
        "SELECT COUNT(*) FROM tasks WHERE user_id = (?1) AND category = (?2)",
        params![user_id, category],
        |row| row.get(0),
    )?;

    Ok(count as usize)
}

/// Caller must hold the connection for the whole call so the limit check
/// and the insert cannot interleave with another create.
pub fn add_task_to_db(
    user_id: &str,
    request: CreateTaskRequest,
    now: DateTime<Utc>,
    db_connection: &Connection,
) -> AppResult<Task> {
    request.validate()?;

    let existing = count_tasks_in_category(user_id, request.category, db_connection)?;
    if existing >= MAX_TASKS_PER_CATEGORY {
        return Err(AppError::CategoryLimitExceeded {
            category: request.category,
            existing,
        });
    }

    let task = Task::new(
        user_id.to_string(),
        request.category,
        request.title,
        request.description,
        now,
    );

    db_connection.execute(
        "INSERT INTO tasks (id, user_id, category, title, description, created_at, is_completed, completed_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            task.id,
            task.user_id,
            task.category,
            task.title,
            task.description,
            task.created_at,
            task.is_completed,
            task.completed_at,
        ],
    )?;

    Ok(task)
}

pub fn update_task_in_db(
    task_id: &str,
    user_id: &str,
    request: UpdateTaskRequest,
    db_connection: &Connection,
) -> AppResult<Task> {
    request.validate()?;

    let mut task = get_task_from_db(task_id, user_id, db_connection)?.ok_or(AppError::TaskNotFound)?;
    request.apply(&mut task);

    db_connection.execute(
        "UPDATE tasks SET title = (?1), description = (?2) WHERE id = (?3) AND user_id = (?4)",
        params![task.title, task.description, task_id, user_id],
    )?;

    Ok(task)
}

/// Returns false when there was no such task for this user.
pub fn delete_task_from_db(
    task_id: &str,
    user_id: &str,
    db_connection: &Connection,
) -> InternalResult<bool> {
    let deleted = db_connection.execute(
        "DELETE FROM tasks WHERE id = (?1) AND user_id = (?2)",
        params![task_id, user_id],
    )?;

    if deleted > 0 {
        db_connection.execute(
            "DELETE FROM task_completions WHERE task_id = (?1)",
            params![task_id],
        )?;
    }

    Ok(deleted > 0)
}

/// Persists the newest entry of `task.completion_dates` and the completion flag.
/// Returns false, with nothing written, if the task row no longer exists.
pub fn record_task_completion(task: &Task, db_connection: &Connection) -> InternalResult<bool> {
    let completed_at = task
        .completion_dates
        .last()
        .ok_or(InternalError::from("Task has no completion to record"))?;

    let changed = db_connection.execute(
        "UPDATE tasks SET is_completed = (?1), completed_at = (?2) WHERE id = (?3)",
        params![task.is_completed, task.completed_at, task.id],
    )?;
    if changed != 1 {
        return Ok(false);
    }

    db_connection.execute(
        "INSERT INTO task_completions (task_id, completed_at) VALUES (?1, ?2)",
        params![task.id, completed_at],
    )?;

    Ok(true)
}

#[cfg(test)]
pub fn create_test_task(user_id: &str, category: Category, db_connection: &Connection) -> Task {
    add_task_to_db(
        user_id,
        CreateTaskRequest {
            category,
            title: format!("{} practice", category),
            description: None,
        },
        Utc::now(),
        db_connection,
    )
    .unwrap()
}
