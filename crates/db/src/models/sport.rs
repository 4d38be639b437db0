//! Sport catalog model and DTOs.

use serde::{Deserialize, Serialize};
use sportsbook_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `sports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sport {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a sport.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSport {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// DTO for updating a sport. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSport {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}
