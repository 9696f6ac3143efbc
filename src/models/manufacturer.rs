use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::fmt;

use crate::services::search;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.country)
    }
}

#[derive(Debug, Clone)]
pub struct CreateManufacturerData {
    pub name: String,
    pub country: String,
}

impl Manufacturer {
    /// Creates a new manufacturer record
    pub async fn create(pool: &PgPool, data: CreateManufacturerData) -> Result<Self, sqlx::Error> {
        let manufacturer = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO manufacturers (name, country)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.country)
        .fetch_one(pool)
        .await?;

        Ok(manufacturer)
    }

    /// Finds a manufacturer by its ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let manufacturer = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM manufacturers WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(manufacturer)
    }

    /// Updates a manufacturer's name and country
    pub async fn update(
        pool: &PgPool,
        id: i64,
        name: &str,
        country: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE manufacturers
            SET name = $2, country = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(country)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists all manufacturers in insertion order, for form dropdowns
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let manufacturers = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM manufacturers ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(manufacturers)
    }

    /// Lists a page of manufacturers matching an optional case-insensitive
    /// name filter, in insertion order. No filter returns every record.
    pub async fn search(
        pool: &PgPool,
        name_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let manufacturers = match search::normalize(name_filter) {
            Some(term) => {
                sqlx::query_as::<_, Self>(
                    r#"
                    SELECT * FROM manufacturers
                    WHERE name ILIKE $1
                    ORDER BY id
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(search::like_pattern(term))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Self>(
                    r#"
                    SELECT * FROM manufacturers
                    ORDER BY id
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(manufacturers)
    }

    /// Counts manufacturers matching an optional name filter
    pub async fn count_matching(
        pool: &PgPool,
        name_filter: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let count = match search::normalize(name_filter) {
            Some(term) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*) FROM manufacturers WHERE name ILIKE $1
                    "#,
                )
                .bind(search::like_pattern(term))
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*) FROM manufacturers
                    "#,
                )
                .fetch_one(pool)
                .await?
            }
        };

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manufacturer_str() {
        let manufacturer = Manufacturer {
            id: 1,
            name: "test".to_string(),
            country: "AMERICAtest".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(manufacturer.to_string(), "test AMERICAtest");
    }
}
