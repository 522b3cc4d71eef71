use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{delete, get, post, State};

use crate::internal_error::{AppError, AppResult};

use super::data::*;
use super::helpers::*;
use crate::data::{DBConnection, MessageResponse};
use crate::users::auth::AuthenticatedUser;

#[get("/quotes/favorites")]
pub fn get_favorites(
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<Vec<FavoriteQuote>>> {
    let db_connection = db_connection.lock()?;

    Ok(Json(get_favorites_from_db(&user.id, &db_connection)?))
}

#[post("/quotes/favorites", format = "json", data = "<save_favorite_request>")]
pub fn save_favorite(
    save_favorite_request: Json<SaveFavoriteRequest>,
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<FavoriteQuote>> {
    let db_connection = db_connection.lock()?;

    add_favorite_to_db(
        &user.id,
        save_favorite_request.into_inner(),
        Utc::now(),
        &db_connection,
    )
    .map(Json)
}

#[delete("/quotes/favorites/<quote_id>")]
pub fn remove_favorite(
    quote_id: &str,
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<MessageResponse>> {
    let db_connection = db_connection.lock()?;

    if !delete_favorite_from_db(quote_id, &user.id, &db_connection)? {
        return Err(AppError::QuoteNotFound);
    }

    Ok(Json(MessageResponse::new("Favorite quote removed")))
}

#[delete("/quotes/favorites?<quote>&<author>")]
pub fn remove_favorite_by_content(
    quote: &str,
    author: &str,
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<MessageResponse>> {
    let db_connection = db_connection.lock()?;

    if !delete_favorite_by_content_from_db(quote, author, &user.id, &db_connection)? {
        return Err(AppError::QuoteNotFound);
    }

    Ok(Json(MessageResponse::new("Favorite quote removed")))
}
