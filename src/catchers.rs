use rocket::catch;
use rocket::serde::json::Json;

use crate::internal_error::ErrorBody;

#[catch(400)]
pub fn bad_request() -> Json<ErrorBody> {
    Json(ErrorBody::new("Bad request"))
}

#[catch(401)]
pub fn unauthorized() -> Json<ErrorBody> {
    Json(ErrorBody::new("Invalid authentication credentials"))
}

#[catch(404)]
pub fn not_found() -> Json<ErrorBody> {
    Json(ErrorBody::new("Not found"))
}

#[catch(422)]
pub fn unprocessable_entity() -> Json<ErrorBody> {
    Json(ErrorBody::new("Request body could not be parsed"))
}

#[catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody::new("Internal server error"))
}
