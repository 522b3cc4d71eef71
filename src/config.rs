use serde::Deserialize;

/// Application settings, read from the same figment as Rocket's own
/// (`Rocket.toml`, then `ROCKET_*` environment variables).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_database_path() -> String {
    "habit_league.db".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for AppConfig {
    fn default() -> AppConfig {
        AppConfig {
            database_path: default_database_path(),
            cors_origins: default_cors_origins(),
        }
    }
}
