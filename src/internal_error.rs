use rocket::http::Status;
use rocket::response::{self, status, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;
use tracing::error;

use std::error::Error;
use std::fmt;
use std::sync::PoisonError;

use crate::progression::data::Category;

#[derive(Debug)]
pub struct InternalError {
    what: String,
}

impl Error for InternalError {}
impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Generic internal error: {}", self.what)
    }
}

impl<T> From<PoisonError<T>> for InternalError {
    fn from(e: PoisonError<T>) -> InternalError {
        InternalError {
            what: e.to_string(),
        }
    }
}

impl From<rusqlite::Error> for InternalError {
    fn from(e: rusqlite::Error) -> InternalError {
        InternalError {
            what: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for InternalError {
    fn from(e: serde_json::Error) -> InternalError {
        InternalError {
            what: e.to_string(),
        }
    }
}

impl From<&str> for InternalError {
    fn from(s: &str) -> InternalError {
        InternalError {
            what: s.to_string(),
        }
    }
}

pub type InternalResult<T> = Result<T, InternalError>;

/// Coarse classification of failures, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unauthenticated,
    Invalid,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Task not found")]
    TaskNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Favorite quote not found")]
    QuoteNotFound,

    #[error("Task already completed today")]
    AlreadyCompletedToday,

    #[error("Maximum 2 tasks allowed per category. You already have {existing} tasks in {category} category.")]
    CategoryLimitExceeded { category: Category, existing: usize },

    #[error("Username already registered")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Concurrent update, retry")]
    Contention,

    #[error("Invalid authentication credentials")]
    Unauthenticated,

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::TaskNotFound | AppError::UserNotFound | AppError::QuoteNotFound => {
                ErrorKind::NotFound
            }
            AppError::AlreadyCompletedToday
            | AppError::CategoryLimitExceeded { .. }
            | AppError::UsernameTaken
            | AppError::EmailTaken
            | AppError::Contention => ErrorKind::Conflict,
            AppError::Unauthenticated => ErrorKind::Unauthenticated,
            AppError::Invalid(_) => ErrorKind::Invalid,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> Status {
        match self.kind() {
            ErrorKind::NotFound => Status::NotFound,
            ErrorKind::Conflict => Status::Conflict,
            ErrorKind::Unauthenticated => Status::Unauthorized,
            ErrorKind::Invalid => Status::BadRequest,
            ErrorKind::Internal => Status::InternalServerError,
        }
    }
}

impl<T> From<PoisonError<T>> for AppError {
    fn from(e: PoisonError<T>) -> AppError {
        AppError::Internal(e.into())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> AppError {
        AppError::Internal(e.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> ErrorBody {
        ErrorBody {
            detail: detail.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let detail = match &self {
            AppError::Internal(e) => {
                error!("{} {} failed: {}", request.method(), request.uri(), e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        status::Custom(self.status(), Json(ErrorBody::new(detail))).respond_to(request)
    }
}
