use rocket::figment::Figment;
use rocket::{Build, Rocket};
use rusqlite::Connection;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::error::Error;
use std::sync::{Arc, Mutex};

mod catchers;
mod config;
mod cors;
mod data;
mod internal_error;
mod progression;
mod quotes;
mod tasks;
mod users;

use config::AppConfig;
use cors::Cors;
use data::init_db;

pub fn build_rocket(figment: Figment, connection: Connection, config: &AppConfig) -> Rocket<Build> {
    let connection = Arc::new(Mutex::new(connection));

    rocket::custom(figment)
        .manage(connection)
        .attach(Cors::new(config.cors_origins.clone()))
        .mount(
            "/api",
            rocket::routes![
                users::endpoints::register,
                users::endpoints::get_me,
                tasks::endpoints::get_tasks,
                tasks::endpoints::create_task,
                tasks::endpoints::update_task,
                tasks::endpoints::delete_task,
                tasks::endpoints::complete_task,
                progression::endpoints::get_radar_stats,
                progression::endpoints::get_daily_progress,
                progression::endpoints::get_leaderboard,
                quotes::endpoints::get_favorites,
                quotes::endpoints::save_favorite,
                quotes::endpoints::remove_favorite,
                quotes::endpoints::remove_favorite_by_content,
            ],
        )
        .register(
            "/",
            rocket::catchers![
                catchers::bad_request,
                catchers::unauthorized,
                catchers::not_found,
                catchers::unprocessable_entity,
                catchers::internal_error,
            ],
        )
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let figment = rocket::Config::figment();
    let config: AppConfig = figment.extract()?;

    let connection = Connection::open(&config.database_path)?;
    init_db(&connection)?;
    info!(database = %config.database_path, "database ready");

    build_rocket(figment, connection, &config).launch().await?;

    Ok(())
}
