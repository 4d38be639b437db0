//! Repository for the `reviews` table.
//!
//! Every write also refreshes `facilities.average_rating` in the same
//! transaction. Writers lock the facility row first, so each recompute sees
//! every review committed before it.

use sqlx::PgPool;
use sportsbook_core::types::DbId;

use crate::models::review::{CreateReview, Review, ReviewWithAuthor};

const COLUMNS: &str = "id, facility_id, user_id, rating, comment, created_at, updated_at";

/// Provides review operations.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Add a review. Fails with `uq_reviews_facility_user` when the user has
    /// already reviewed the facility.
    pub async fn create(pool: &PgPool, input: &CreateReview) -> Result<Review, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::lock_facility_inner(&mut tx, input.facility_id).await?;

        let query = format!(
            "INSERT INTO reviews (facility_id, user_id, rating, comment) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(input.facility_id)
            .bind(input.user_id)
            .bind(input.rating)
            .bind(&input.comment)
            .fetch_one(&mut *tx)
            .await?;

        Self::refresh_average_inner(&mut tx, input.facility_id).await?;

        tx.commit().await?;
        Ok(review)
    }

    /// Reviews for one facility with author names, newest first.
    pub async fn list_for_facility(
        pool: &PgPool,
        facility_id: DbId,
    ) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.id, r.facility_id, r.user_id, r.rating, r.comment, \
                    r.created_at, r.updated_at, u.full_name AS user_name \
             FROM reviews r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.facility_id = $1 \
             ORDER BY r.created_at DESC",
        )
        .bind(facility_id)
        .fetch_all(pool)
        .await
    }

    /// Remove a review belonging to `facility_id`. Returns `true` if a row
    /// was removed.
    pub async fn delete(pool: &PgPool, facility_id: DbId, review_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::lock_facility_inner(&mut tx, facility_id).await?;

        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND facility_id = $2")
            .bind(review_id)
            .bind(facility_id)
            .execute(&mut *tx)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            Self::refresh_average_inner(&mut tx, facility_id).await?;
        }

        tx.commit().await?;
        Ok(removed)
    }

    async fn lock_facility_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        facility_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1 FROM facilities WHERE id = $1 FOR UPDATE")
            .bind(facility_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn refresh_average_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        facility_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE facilities SET average_rating = COALESCE( \
                 (SELECT AVG(rating)::DOUBLE PRECISION FROM reviews WHERE facility_id = $1), 0) \
             WHERE id = $1",
        )
        .bind(facility_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
