//! Facility and sport-offering models and DTOs.

use serde::{Deserialize, Serialize};
use sportsbook_core::error::CoreError;
use sportsbook_core::operating::{OperatingDays, OperatingWindow};
use sportsbook_core::types::{DbId, Hour, Timestamp};
use sqlx::FromRow;

use crate::models::review::ReviewWithAuthor;

/// A row from the `facilities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Facility {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub contact_number: Option<String>,
    pub photos: Vec<String>,
    pub amenities: Vec<String>,
    /// Mean of all review ratings, 0 when unreviewed.
    pub average_rating: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A sport offered at a facility, joined with the sport's name.
///
/// This is the capacity record the availability engine runs against.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FacilitySport {
    pub id: DbId,
    pub facility_id: DbId,
    pub sport_id: DbId,
    pub sport_name: String,
    /// Price per resource per hour, in the smallest currency unit.
    pub price: i64,
    pub resource_count: i32,
    pub max_people_per_unit: i32,
    pub opening_hour: i16,
    pub closing_hour: i16,
    pub operating_days: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FacilitySport {
    /// Number of interchangeable bookable units.
    pub fn capacity(&self) -> u32 {
        u32::try_from(self.resource_count).unwrap_or(0)
    }

    pub fn max_people(&self) -> u32 {
        u32::try_from(self.max_people_per_unit).unwrap_or(0)
    }

    pub fn operating_window(&self) -> Result<OperatingWindow, CoreError> {
        let hour = |value: i16| {
            Hour::try_from(value).map_err(|_| {
                CoreError::Internal(format!(
                    "facility_sports row {} has invalid hour {value}",
                    self.id
                ))
            })
        };
        let days: OperatingDays = self.operating_days.parse()?;
        OperatingWindow::new(hour(self.opening_hour)?, hour(self.closing_hour)?, days)
    }
}

/// One sport offering inside a create or update request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOffering {
    pub sport_id: DbId,
    pub price: i64,
    pub resource_count: i32,
    pub max_people_per_unit: i32,
    pub opening_hour: i16,
    pub closing_hour: i16,
    pub operating_days: String,
}

/// DTO for creating a facility together with its offerings.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFacility {
    pub owner_id: DbId,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub contact_number: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub offerings: Vec<NewOffering>,
}

/// DTO for updating a facility. All fields are optional.
///
/// When `offerings` is `Some`, the full set of offerings is replaced.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFacility {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub contact_number: Option<String>,
    pub photos: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub offerings: Option<Vec<NewOffering>>,
}

/// Search filters for the facility listing. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacilitySearch {
    /// Substring of the facility name.
    pub keyword: Option<String>,
    /// Substring of the address.
    pub location: Option<String>,
    /// Exact sport name (case-insensitive).
    pub sport: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

/// Facility enriched with its sport offerings.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityWithSports {
    #[serde(flatten)]
    pub facility: Facility,
    pub sports: Vec<FacilitySport>,
}

/// Facility detail: offerings plus reviews.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityDetail {
    #[serde(flatten)]
    pub facility: Facility,
    pub sports: Vec<FacilitySport>,
    pub reviews: Vec<ReviewWithAuthor>,
}
