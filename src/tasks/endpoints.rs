use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, State};
use serde::Serialize;
use tracing::info;

use crate::internal_error::{AppError, AppResult};

use super::data::*;
use super::helpers::*;
use crate::data::{DBConnection, MessageResponse};
use crate::progression::engine::CompletionOutcome;
use crate::progression::service;
use crate::users::auth::AuthenticatedUser;

#[derive(Serialize, Debug)]
pub struct CompleteTaskResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: CompletionOutcome,
}

#[get("/tasks")]
pub fn get_tasks(
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<Vec<Task>>> {
    let db_connection = db_connection.lock()?;

    Ok(Json(get_tasks_from_db(&user.id, &db_connection)?))
}

#[post("/tasks", format = "json", data = "<create_task_request>")]
pub fn create_task(
    create_task_request: Json<CreateTaskRequest>,
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<Task>> {
    let db_connection = db_connection.lock()?;

    let task = add_task_to_db(
        &user.id,
        create_task_request.into_inner(),
        Utc::now(),
        &db_connection,
    )?;
    info!(user = %user.id, task = %task.id, category = %task.category, "task created");

    Ok(Json(task))
}

#[put("/tasks/<task_id>", format = "json", data = "<update_task_request>")]
pub fn update_task(
    task_id: &str,
    update_task_request: Json<UpdateTaskRequest>,
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<Task>> {
    let db_connection = db_connection.lock()?;

    update_task_in_db(task_id, &user.id, update_task_request.into_inner(), &db_connection).map(Json)
}

#[delete("/tasks/<task_id>")]
pub fn delete_task(
    task_id: &str,
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<MessageResponse>> {
    let db_connection = db_connection.lock()?;

    if !delete_task_from_db(task_id, &user.id, &db_connection)? {
        return Err(AppError::TaskNotFound);
    }

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

#[post("/tasks/<task_id>/complete")]
pub fn complete_task(
    task_id: &str,
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<CompleteTaskResponse>> {
    let outcome = service::complete_task(db_connection, &user.id, task_id, Utc::now())?;

    Ok(Json(CompleteTaskResponse {
        message: "Task completed successfully".to_string(),
        outcome,
    }))
}
