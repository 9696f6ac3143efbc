use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.username, self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct CreateDriverData {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
}

impl Driver {
    /// Creates a new driver record
    pub async fn create(pool: &PgPool, data: CreateDriverData) -> Result<Self, sqlx::Error> {
        let driver = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO drivers (username, password_hash, first_name, last_name, license_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.license_number)
        .fetch_one(pool)
        .await?;

        Ok(driver)
    }

    /// Finds a driver by their ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let driver = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM drivers WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(driver)
    }

    /// Finds a driver by their username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let driver = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM drivers WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(driver)
    }

    /// Lists a page of drivers in insertion order
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let drivers = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM drivers ORDER BY id LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(drivers)
    }

    /// Counts all drivers
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM drivers
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Updates a driver's license number
    pub async fn update_license(
        pool: &PgPool,
        id: i64,
        license_number: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE drivers
            SET license_number = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(license_number)
        .execute(pool)
        .await?;

        Ok(())
    }
}
