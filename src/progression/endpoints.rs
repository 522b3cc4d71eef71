use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, State};

use crate::internal_error::{AppError, AppResult};

use super::data::{DailyProgress, RadarStats};
use super::helpers::get_recent_daily_progress;
use super::leaderboard::{rank, LeaderboardEntry};
use super::service;
use crate::data::DBConnection;
use crate::users::auth::AuthenticatedUser;
use crate::users::data::Language;
use crate::users::helpers::get_contenders_from_db;

const DEFAULT_HISTORY_DAYS: usize = 7;
const MAX_HISTORY_DAYS: usize = 30;

#[get("/stats/radar")]
pub fn get_radar_stats(
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<RadarStats>> {
    service::get_radar_stats(db_connection, &user.id, Utc::now()).map(Json)
}

fn parse_history_days(days: Option<&str>) -> AppResult<usize> {
    let days = match days {
        Some(days) => days.parse::<usize>().ok(),
        None => Some(DEFAULT_HISTORY_DAYS),
    };

    match days {
        Some(days) if (1..=MAX_HISTORY_DAYS).contains(&days) => Ok(days),
        _ => Err(AppError::Invalid(format!(
            "days must be between 1 and {}",
            MAX_HISTORY_DAYS
        ))),
    }
}

fn parse_language_filter(language: Option<&str>) -> AppResult<Option<Language>> {
    language
        .map(|code| {
            Language::from_code(code)
                .ok_or_else(|| AppError::Invalid(format!("Unknown language: {}", code)))
        })
        .transpose()
}

#[get("/stats/daily?<days>")]
pub fn get_daily_progress(
    days: Option<&str>,
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<Vec<DailyProgress>>> {
    let days = parse_history_days(days)?;

    let db_connection = db_connection.lock()?;

    Ok(Json(get_recent_daily_progress(&user.id, days, &db_connection)?))
}

#[get("/leaderboard?<language>")]
pub fn get_leaderboard(
    language: Option<&str>,
    _user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> AppResult<Json<Vec<LeaderboardEntry>>> {
    let language = parse_language_filter(language)?;
    let contenders = get_contenders_from_db(&*db_connection.lock()?)?;

    Ok(Json(rank(&contenders, language)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_days_default_and_bounds() {
        assert_eq!(parse_history_days(None).unwrap(), 7);
        assert_eq!(parse_history_days(Some("30")).unwrap(), 30);
        assert!(matches!(parse_history_days(Some("0")), Err(AppError::Invalid(_))));
        assert!(matches!(parse_history_days(Some("31")), Err(AppError::Invalid(_))));
        assert!(matches!(parse_history_days(Some("week")), Err(AppError::Invalid(_))));
    }

    #[test]
    fn unknown_language_filter_is_rejected() {
        assert_eq!(parse_language_filter(None).unwrap(), None);
        assert_eq!(parse_language_filter(Some("fr")).unwrap(), Some(Language::French));
        assert!(matches!(parse_language_filter(Some("xx")), Err(AppError::Invalid(_))));
    }
}
