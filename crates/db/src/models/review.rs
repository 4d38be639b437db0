//! Facility review model and DTOs.

use serde::{Deserialize, Serialize};
use sportsbook_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub facility_id: DbId,
    pub user_id: DbId,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Review joined with the author's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub user_name: String,
}

/// DTO for adding a review.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub facility_id: DbId,
    pub user_id: DbId,
    pub rating: i16,
    pub comment: Option<String>,
}
