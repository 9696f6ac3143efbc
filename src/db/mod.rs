use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;
use crate::models::driver::{CreateDriverData, Driver};
use crate::services::password;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

/// Seeds the first driver account from config when the drivers table is
/// empty, so a fresh deployment has a login.
pub async fn bootstrap_admin(pool: &PgPool, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(pw)) = (&config.bootstrap_username, &config.bootstrap_password)
    else {
        return Ok(());
    };

    if Driver::count(pool).await? > 0 {
        return Ok(());
    }

    let password_hash = password::hash_password(pw.expose_secret())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to hash bootstrap password: {}", e)))?;

    let driver = Driver::create(
        pool,
        CreateDriverData {
            username: username.clone(),
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            license_number: config
                .bootstrap_license_number
                .clone()
                .unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(driver_id = driver.id, username = %driver.username, "Bootstrapped admin driver");

    Ok(())
}
