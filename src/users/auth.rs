use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

use crate::data::DBConnection;
use crate::internal_error::{AppError, InternalError};

use super::data::UserID;
use super::helpers::user_exists;

/// Carries the caller's identity, established upstream.
pub const USER_ID_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: UserID,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AppError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let id = match request.headers().get_one(USER_ID_HEADER).map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Outcome::Error((Status::Unauthorized, AppError::Unauthenticated)),
        };

        let db_connection = match request.rocket().state::<DBConnection>() {
            Some(db_connection) => db_connection,
            None => {
                let e = InternalError::from("Database connection not managed");
                return Outcome::Error((Status::InternalServerError, e.into()));
            }
        };

        let known = db_connection
            .lock()
            .map_err(InternalError::from)
            .and_then(|connection| user_exists(&id, &connection));

        match known {
            Ok(true) => Outcome::Success(AuthenticatedUser { id }),
            Ok(false) => Outcome::Error((Status::Unauthorized, AppError::Unauthenticated)),
            Err(e) => Outcome::Error((Status::InternalServerError, e.into())),
        }
    }
}
