use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::internal_error::{AppError, AppResult};
use crate::users::data::UserID;

pub type QuoteID = String;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FavoriteQuote {
    pub id: QuoteID,
    pub user_id: UserID,
    pub quote: String,
    pub author: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug)]
pub struct SaveFavoriteRequest {
    pub quote: String,
    pub author: String,
}

impl SaveFavoriteRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.quote.trim().is_empty() {
            return Err(AppError::Invalid("Quote must not be empty".to_string()));
        }

        Ok(())
    }
}
