//! Booking model and DTOs.

use chrono::NaiveDate;
use serde::Serialize;
use sportsbook_core::availability::{Reservation, Slot};
use sportsbook_core::booking::BookingStatus;
use sportsbook_core::error::CoreError;
use sportsbook_core::types::{DbId, Hour, Timestamp};
use sqlx::FromRow;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: DbId,
    pub user_id: DbId,
    pub facility_id: DbId,
    pub sport_id: DbId,
    #[serde(rename = "date")]
    pub booking_date: NaiveDate,
    pub start_hour: i16,
    pub duration_hours: i16,
    pub resource_count: i32,
    pub people_count: i32,
    pub payment_mode: String,
    pub total_price: i64,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn status(&self) -> Result<BookingStatus, CoreError> {
        self.status.parse()
    }

    pub fn slot(&self) -> Result<Slot, CoreError> {
        let start = Hour::try_from(self.start_hour).map_err(|_| self.corrupt("start_hour"))?;
        let duration = u8::try_from(self.duration_hours).map_err(|_| self.corrupt("duration_hours"))?;
        Slot::new(start, duration)
    }

    /// This booking as an input to the availability engine.
    pub fn reservation(&self) -> Result<Reservation, CoreError> {
        Ok(Reservation {
            slot: self.slot()?,
            resource_count: u32::try_from(self.resource_count)
                .map_err(|_| self.corrupt("resource_count"))?,
            status: self.status()?,
        })
    }

    fn corrupt(&self, column: &str) -> CoreError {
        CoreError::Internal(format!("bookings row {} has invalid {column}", self.id))
    }
}

/// Booking joined with facility, sport and customer names for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub facility_name: String,
    pub sport_name: String,
    pub user_name: String,
    pub user_email: String,
}

/// DTO for a booking that is about to go through admission.
///
/// The price is not part of the input: it is computed from the capacity
/// record read under lock.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub user_id: DbId,
    pub facility_id: DbId,
    pub sport_id: DbId,
    pub booking_date: NaiveDate,
    pub slot: Slot,
    pub resource_count: u32,
    pub people_count: u32,
    pub payment_mode: String,
}

/// Booking totals for one owner's facilities.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OwnerReport {
    pub total_bookings: i64,
    /// Sum of `total_price` over confirmed bookings.
    pub total_revenue: i64,
}
