use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use tracing::info;

use crate::internal_error::{AppError, AppResult};

use super::auth::AuthenticatedUser;
use super::data::*;
use super::helpers::*;
use crate::data::DBConnection;
use crate::progression::service::apply_pending_deductions;

#[post("/auth/register", format = "json", data = "<register_request>")]
pub fn register(
    register_request: Json<RegisterRequest>,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<User>> {
    let db_connection = db_connection.lock()?;

    let user = add_user_to_db(register_request.into_inner(), Utc::now(), &db_connection)?;
    info!(user = %user.id, username = %user.username, "user registered");

    Ok(Json(user))
}

#[get("/auth/me")]
pub fn get_me(user: AuthenticatedUser, db_connection: &State<DBConnection>) -> AppResult<Json<User>> {
    apply_pending_deductions(db_connection, &user.id, Utc::now())?;

    let db_connection = db_connection.lock()?;
    get_user_from_db(&user.id, &db_connection)?
        .map(Json)
        .ok_or(AppError::UserNotFound)
}
