use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::fmt;

use crate::services::search;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: i64,
    pub model: String,
    pub manufacturer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model)
    }
}

/// A car joined with its manufacturer, for list and detail views
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CarWithManufacturer {
    pub id: i64,
    pub model: String,
    pub manufacturer_id: i64,
    pub manufacturer_name: String,
    pub manufacturer_country: String,
}

#[derive(Debug, Clone)]
pub struct CreateCarData {
    pub model: String,
    pub manufacturer_id: i64,
}

impl Car {
    /// Creates a new car record
    pub async fn create(pool: &PgPool, data: CreateCarData) -> Result<Self, sqlx::Error> {
        let car = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO cars (model, manufacturer_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&data.model)
        .bind(data.manufacturer_id)
        .fetch_one(pool)
        .await?;

        Ok(car)
    }

    /// Finds a car by its ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let car = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM cars WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(car)
    }

    /// Finds a car with its manufacturer attached
    pub async fn find_detail(
        pool: &PgPool,
        id: i64,
    ) -> Result<Option<CarWithManufacturer>, sqlx::Error> {
        let car = sqlx::query_as::<_, CarWithManufacturer>(
            r#"
            SELECT c.id, c.model, c.manufacturer_id,
                   m.name AS manufacturer_name, m.country AS manufacturer_country
            FROM cars c
            JOIN manufacturers m ON m.id = c.manufacturer_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(car)
    }

    /// Updates a car's model and manufacturer
    pub async fn update(
        pool: &PgPool,
        id: i64,
        model: &str,
        manufacturer_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE cars
            SET model = $2, manufacturer_id = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(model)
        .bind(manufacturer_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists a page of cars matching an optional case-insensitive model
    /// filter, in insertion order. No filter returns every record.
    pub async fn search(
        pool: &PgPool,
        model_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CarWithManufacturer>, sqlx::Error> {
        let cars = match search::normalize(model_filter) {
            Some(term) => {
                sqlx::query_as::<_, CarWithManufacturer>(
                    r#"
                    SELECT c.id, c.model, c.manufacturer_id,
                           m.name AS manufacturer_name, m.country AS manufacturer_country
                    FROM cars c
                    JOIN manufacturers m ON m.id = c.manufacturer_id
                    WHERE c.model ILIKE $1
                    ORDER BY c.id
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
                sqlx::query_as::<_, CarWithManufacturer>(
                    r#"
                    SELECT c.id, c.model, c.manufacturer_id,
                           m.name AS manufacturer_name, m.country AS manufacturer_country
                    FROM cars c
                    JOIN manufacturers m ON m.id = c.manufacturer_id
                    ORDER BY c.id
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(cars)
    }

    /// Counts cars matching an optional model filter
    pub async fn count_matching(
        pool: &PgPool,
        model_filter: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let count = match search::normalize(model_filter) {
            Some(term) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*) FROM cars WHERE model ILIKE $1
                    "#,
                )
                .bind(search::like_pattern(term))
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*) FROM cars
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
    fn test_car_str() {
        let car = Car {
            id: 1,
            model: "test".to_string(),
            manufacturer_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(car.to_string(), "test");
    }
}
