use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::internal_error::{AppError, AppResult};
use crate::progression::data::Category;
use crate::users::data::UserID;

pub type TaskID = String;

pub const MAX_TASKS_PER_CATEGORY: usize = 2;
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskID,
    pub user_id: UserID,
    pub category: Category,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub completion_dates: Vec<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        user_id: UserID,
        category: Category,
        title: String,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Task {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            category,
            title,
            description,
            created_at: now,
            is_completed: false,
            completed_at: None,
            completion_dates: vec![],
        }
    }

    /// Compares calendar dates, not instants.
    pub fn completed_on(&self, date: NaiveDate) -> bool {
        self.completion_dates
            .iter()
            .any(|completion| completion.date_naive() == date)
    }

    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.completion_dates.push(now);
        self.is_completed = true;
        self.completed_at = Some(now);
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::Invalid("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Invalid(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }

    Ok(())
}

fn validate_description(description: &Option<String>) -> AppResult<()> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(AppError::Invalid(format!(
            "Description must be at most {} characters",
            MAX_DESCRIPTION_LEN
        ))),
        _ => Ok(()),
    }
}

#[derive(Deserialize, Debug)]
pub struct CreateTaskRequest {
    pub category: Category,
    pub title: String,
    pub description: Option<String>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_title(&self.title)?;
        validate_description(&self.description)
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        validate_description(&self.description)
    }

    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = Some(description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn completion_is_per_calendar_day() {
        let morning = Utc.with_ymd_and_hms(2026, 5, 4, 0, 5, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2026, 5, 4, 23, 59, 0).unwrap();
        let mut task = Task::new(
            "u".to_string(),
            Category::Physical,
            "Run".to_string(),
            None,
            morning,
        );

        assert!(!task.completed_on(morning.date_naive()));
        task.mark_completed(morning);

        assert!(task.is_completed);
        assert!(task.completed_on(night.date_naive()));
        assert!(!task.completed_on(NaiveDate::from_ymd_opt(2026, 5, 5).unwrap()));
    }

    #[test]
    fn title_and_description_lengths_are_bounded() {
        let ok = CreateTaskRequest {
            category: Category::Social,
            title: "Call a friend".to_string(),
            description: Some("x".repeat(MAX_DESCRIPTION_LEN)),
        };
        assert!(ok.validate().is_ok());

        let long_title = CreateTaskRequest {
            title: "t".repeat(MAX_TITLE_LEN + 1),
            ..ok
        };
        assert!(matches!(long_title.validate(), Err(AppError::Invalid(_))));

        let long_description = UpdateTaskRequest {
            title: None,
            description: Some("d".repeat(MAX_DESCRIPTION_LEN + 1)),
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn update_only_touches_provided_fields() {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap();
        let mut task = Task::new(
            "u".to_string(),
            Category::Intelligence,
            "Read".to_string(),
            Some("20 pages".to_string()),
            now,
        );

        UpdateTaskRequest {
            title: Some("Read a chapter".to_string()),
            description: None,
        }
        .apply(&mut task);

        assert_eq!(task.title, "Read a chapter");
        assert_eq!(task.description.as_deref(), Some("20 pages"));
    }
}
