//! Repository for the `sports` table.

use sqlx::PgPool;
use sportsbook_core::types::DbId;

use crate::models::sport::{CreateSport, Sport, UpdateSport};

const COLUMNS: &str = "id, name, description, image_url, created_at, updated_at";

/// Provides CRUD operations for the sport catalog.
pub struct SportRepo;

impl SportRepo {
    /// Insert a new sport. Fails with a `uq_sports_name` violation on a
    /// duplicate name.
    pub async fn create(pool: &PgPool, input: &CreateSport) -> Result<Sport, sqlx::Error> {
        let query = format!(
            "INSERT INTO sports (name, description, image_url)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sport>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sports WHERE id = $1");
        sqlx::query_as::<_, Sport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup by name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Sport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sports WHERE LOWER(name) = LOWER($1)");
        sqlx::query_as::<_, Sport>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List the catalog alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Sport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sports ORDER BY name");
        sqlx::query_as::<_, Sport>(&query).fetch_all(pool).await
    }

    /// Update a sport. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSport,
    ) -> Result<Option<Sport>, sqlx::Error> {
        let query = format!(
            "UPDATE sports SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sport>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a sport. Fails with an `fk_*` violation while any facility
    /// still offers it. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
