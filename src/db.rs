//! Database connection management
//!
//! Handles pool creation and bootstrap of the cinema schema.

pub mod queries;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::info;

/// Create a connection pool from configuration and verify connectivity
pub async fn create_pool(config: &DatabaseConfig) -> Result<Pool, AppError> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(config.database.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    let pool = cfg
        .create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| AppError::Config(format!("Failed to create pool: {}", e)))?;

    // Probe before serving traffic
    let client = pool.get().await?;
    client
        .query_one("SELECT 1", &[])
        .await
        .map_err(AppError::Query)?;
    drop(client);

    info!("Database connection pool established");
    Ok(pool)
}

/// Create the cinema tables if they don't exist
///
/// No foreign-key constraints are declared: referential integrity on delete
/// is owned by the gateway's cascade plan, which must stay correct even
/// against a schema without constraints.
pub async fn ensure_schema(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;

    client
        .execute(
            "CREATE TABLE IF NOT EXISTS movies (
                movie_id SERIAL PRIMARY KEY,
                movie_name VARCHAR(255) NOT NULL,
                genre VARCHAR(100),
                duration INTEGER
            )",
            &[],
        )
        .await
        .map_err(AppError::Query)?;

    client
        .execute(
            "CREATE TABLE IF NOT EXISTS theaters (
                theater_id SERIAL PRIMARY KEY,
                theater_name VARCHAR(255) NOT NULL,
                location VARCHAR(255)
            )",
            &[],
        )
        .await
        .map_err(AppError::Query)?;

    client
        .execute(
            "CREATE TABLE IF NOT EXISTS showtimes (
                showtime_id SERIAL PRIMARY KEY,
                movie_id INTEGER,
                theater_id INTEGER,
                show_date DATE,
                show_time TIME
            )",
            &[],
        )
        .await
        .map_err(AppError::Query)?;

    client
        .execute(
            "CREATE TABLE IF NOT EXISTS bookings (
                booking_id SERIAL PRIMARY KEY,
                user_id INTEGER,
                showtime_id INTEGER,
                seats_booked INTEGER
            )",
            &[],
        )
        .await
        .map_err(AppError::Query)?;

    // Indexes backing the cascade-delete scans
    let _ = client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_showtimes_movie_id ON showtimes(movie_id)",
            &[],
        )
        .await;
    let _ = client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_showtimes_theater_id ON showtimes(theater_id)",
            &[],
        )
        .await;
    let _ = client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_bookings_showtime_id ON bookings(showtime_id)",
            &[],
        )
        .await;

    info!("Cinema schema initialized");
    Ok(())
}
