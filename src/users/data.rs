use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::internal_error::{AppError, AppResult};
use crate::progression::data::ProgressionState;

pub type UserID = String;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 20;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[serde(rename = "en")]
    #[default]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Russian,
        Language::Chinese,
        Language::Japanese,
        Language::Korean,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::Chinese => "zh",
            Language::Japanese => "ja",
            Language::Korean => "ko",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        Language::ALL.iter().find(|l| l.code() == code).copied()
    }
}

impl ToSql for Language {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Language {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Language> {
        let code = value.as_str()?;
        Language::from_code(code)
            .ok_or_else(|| FromSqlError::Other(format!("Unknown language: {}", code).into()))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserID,
    pub username: String,
    pub email: String,
    pub language: Language,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub progression: ProgressionState,
}

#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub language: Language,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        let username_len = self.username.chars().count();
        if username_len < MIN_USERNAME_LEN || username_len > MAX_USERNAME_LEN {
            return Err(AppError::Invalid(format!(
                "Username must be between {} and {} characters",
                MIN_USERNAME_LEN, MAX_USERNAME_LEN
            )));
        }

        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(AppError::Invalid("Invalid email address".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            language: Language::default(),
        }
    }

    #[test]
    fn registration_fields_are_checked() {
        assert!(request("ana", "ana@example.com").validate().is_ok());
        assert!(request("an", "ana@example.com").validate().is_err());
        assert!(request(&"a".repeat(21), "ana@example.com").validate().is_err());
        assert!(request("ana", "ana.example.com").validate().is_err());
        assert!(request("ana", "@example.com").validate().is_err());
    }

    #[test]
    fn language_defaults_to_english() {
        let parsed: RegisterRequest =
            serde_json::from_str(r#"{"username":"ana","email":"a@b.c"}"#).unwrap();
        assert_eq!(parsed.language, Language::English);

        let parsed: RegisterRequest =
            serde_json::from_str(r#"{"username":"ana","email":"a@b.c","language":"ko"}"#)
                .unwrap();
        assert_eq!(parsed.language, Language::Korean);
    }
}
