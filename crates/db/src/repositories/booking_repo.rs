//! Repository for the `bookings` table.
//!
//! Writes that consume capacity (new bookings, reinstating a cancelled one)
//! run inside a transaction that first locks the `facility_sports` row for
//! the facility and sport. Concurrent admissions for the same offering
//! therefore serialise, and the availability engine always sees every
//! booking committed before it.

use chrono::NaiveDate;
use sqlx::PgPool;
use sportsbook_core::availability::{Availability, Proposal, Reservation};
use sportsbook_core::booking::{
    check_occupants, total_price, transition_reclaims_capacity, BookingStatus,
};
use sportsbook_core::error::CoreError;
use sportsbook_core::types::DbId;

use crate::error::AdmissionError;
use crate::models::booking::{Booking, BookingListing, CreateBooking, OwnerReport};
use crate::models::facility::FacilitySport;
use crate::repositories::facility_repo::OFFERING_COLUMNS;

const COLUMNS: &str = "id, user_id, facility_id, sport_id, booking_date, start_hour, \
                       duration_hours, resource_count, people_count, payment_mode, \
                       total_price, status, created_at, updated_at";

/// Booking columns joined with facility, sport and user names.
const LISTING_SELECT: &str =
    "SELECT b.id, b.user_id, b.facility_id, b.sport_id, b.booking_date, b.start_hour, \
            b.duration_hours, b.resource_count, b.people_count, b.payment_mode, \
            b.total_price, b.status, b.created_at, b.updated_at, \
            f.name AS facility_name, s.name AS sport_name, \
            u.full_name AS user_name, u.email AS user_email \
     FROM bookings b \
     JOIN facilities f ON f.id = b.facility_id \
     JOIN sports s ON s.id = b.sport_id \
     JOIN users u ON u.id = b.user_id";

/// Provides booking admission, status changes and listings.
pub struct BookingRepo;

impl BookingRepo {
    /// Admit `input` against current capacity and insert it as `Confirmed`.
    ///
    /// Rejects with [`CoreError::NotFound`] when the facility or the sport
    /// offering does not exist, [`CoreError::Validation`] when the slot is
    /// outside the operating window or the party is too large, and
    /// [`CoreError::InsufficientCapacity`] when any hour of the window lacks
    /// free resources.
    pub async fn create_admitted(
        pool: &PgPool,
        input: &CreateBooking,
    ) -> Result<Booking, AdmissionError> {
        let mut tx = pool.begin().await?;

        let offering = match Self::lock_offering_inner(&mut tx, input.facility_id, input.sport_id).await? {
            Some(offering) => offering,
            None => {
                let facility_exists: bool =
                    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM facilities WHERE id = $1)")
                        .bind(input.facility_id)
                        .fetch_one(&mut *tx)
                        .await?;
                let missing = if facility_exists {
                    CoreError::NotFound {
                        entity: "FacilitySport",
                        id: input.sport_id,
                    }
                } else {
                    CoreError::NotFound {
                        entity: "Facility",
                        id: input.facility_id,
                    }
                };
                return Err(missing.into());
            }
        };

        offering
            .operating_window()?
            .check_slot(input.booking_date, &input.slot)?;
        check_occupants(input.people_count, input.resource_count, offering.max_people())?;

        let proposal = Proposal::new(input.slot, input.resource_count)?;
        let existing = Self::reservations_inner(
            &mut tx,
            input.facility_id,
            input.sport_id,
            input.booking_date,
            None,
        )
        .await?;
        Availability::new(offering.capacity(), &existing).admit(&proposal)?;

        let price = total_price(
            offering.price,
            input.resource_count,
            input.slot.duration_hours(),
        )?;

        let query = format!(
            "INSERT INTO bookings \
                (user_id, facility_id, sport_id, booking_date, start_hour, duration_hours, \
                 resource_count, people_count, payment_mode, total_price, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(input.user_id)
            .bind(input.facility_id)
            .bind(input.sport_id)
            .bind(input.booking_date)
            .bind(i16::from(input.slot.start_hour()))
            .bind(i16::from(input.slot.duration_hours()))
            .bind(to_db_count(input.resource_count, "resource count")?)
            .bind(to_db_count(input.people_count, "people count")?)
            .bind(&input.payment_mode)
            .bind(price)
            .bind(BookingStatus::Confirmed.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(booking)
    }

    /// Move a booking to `target`.
    ///
    /// Leaving `Cancelled` re-runs admission with the booking itself excluded
    /// from the existing set. Returns `None` if the booking does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        target: BookingStatus,
    ) -> Result<Option<Booking>, AdmissionError> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let mut tx = pool.begin().await?;

        // Lock order matches create_admitted: offering first, then bookings.
        let offering = if target.holds_capacity() {
            Self::lock_offering_inner(&mut tx, current.facility_id, current.sport_id).await?
        } else {
            None
        };

        let lock_query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE");
        let Some(locked) = sqlx::query_as::<_, Booking>(&lock_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if transition_reclaims_capacity(locked.status()?, target) {
            tracing::debug!(booking_id = id, to = %target, "Re-admitting cancelled booking");
            let offering = offering.ok_or(CoreError::NotFound {
                entity: "FacilitySport",
                id: locked.sport_id,
            })?;
            let reservation = locked.reservation()?;
            let existing = Self::reservations_inner(
                &mut tx,
                locked.facility_id,
                locked.sport_id,
                locked.booking_date,
                Some(locked.id),
            )
            .await?;
            let proposal = Proposal::new(reservation.slot, reservation.resource_count)?;
            Availability::new(offering.capacity(), &existing).admit(&proposal)?;
        }

        let update_query =
            format!("UPDATE bookings SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let booking = sqlx::query_as::<_, Booking>(&update_query)
            .bind(id)
            .bind(target.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(booking))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Non-cancelled bookings for one facility, sport and date.
    pub async fn active_for_date(
        pool: &PgPool,
        facility_id: DbId,
        sport_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings \
             WHERE facility_id = $1 AND sport_id = $2 AND booking_date = $3 \
               AND status <> 'Cancelled' \
             ORDER BY start_hour, id"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(facility_id)
            .bind(sport_id)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    /// Bookings made by `user_id`, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<BookingListing>, sqlx::Error> {
        let query = format!("{LISTING_SELECT} WHERE b.user_id = $1 ORDER BY b.created_at DESC");
        sqlx::query_as::<_, BookingListing>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Bookings at any facility owned by `owner_id`, newest first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<BookingListing>, sqlx::Error> {
        let query = format!("{LISTING_SELECT} WHERE f.owner_id = $1 ORDER BY b.created_at DESC");
        sqlx::query_as::<_, BookingListing>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Every booking, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<BookingListing>, sqlx::Error> {
        let query = format!("{LISTING_SELECT} ORDER BY b.created_at DESC");
        sqlx::query_as::<_, BookingListing>(&query)
            .fetch_all(pool)
            .await
    }

    /// Booking count and confirmed revenue across an owner's facilities.
    pub async fn owner_report(pool: &PgPool, owner_id: DbId) -> Result<OwnerReport, sqlx::Error> {
        sqlx::query_as::<_, OwnerReport>(
            "SELECT COUNT(*) AS total_bookings, \
                    COALESCE(SUM(b.total_price) FILTER (WHERE b.status = 'Confirmed'), 0)::BIGINT \
                        AS total_revenue \
             FROM bookings b \
             JOIN facilities f ON f.id = b.facility_id \
             WHERE f.owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await
    }

    /// Permanently delete a booking. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Lock the capacity record for the rest of the transaction.
    async fn lock_offering_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        facility_id: DbId,
        sport_id: DbId,
    ) -> Result<Option<FacilitySport>, sqlx::Error> {
        let query = format!(
            "SELECT {OFFERING_COLUMNS} \
             FROM facility_sports fs \
             JOIN sports s ON s.id = fs.sport_id \
             WHERE fs.facility_id = $1 AND fs.sport_id = $2 \
             FOR UPDATE OF fs"
        );
        sqlx::query_as::<_, FacilitySport>(&query)
            .bind(facility_id)
            .bind(sport_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Non-cancelled bookings for the date as engine input, optionally
    /// leaving one booking out.
    async fn reservations_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        facility_id: DbId,
        sport_id: DbId,
        date: NaiveDate,
        exclude_id: Option<DbId>,
    ) -> Result<Vec<Reservation>, AdmissionError> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings \
             WHERE facility_id = $1 AND sport_id = $2 AND booking_date = $3 \
               AND status <> 'Cancelled' \
               AND ($4::BIGINT IS NULL OR id <> $4)"
        );
        let rows = sqlx::query_as::<_, Booking>(&query)
            .bind(facility_id)
            .bind(sport_id)
            .bind(date)
            .bind(exclude_id)
            .fetch_all(&mut **tx)
            .await?;

        let reservations = rows
            .iter()
            .map(Booking::reservation)
            .collect::<Result<Vec<_>, CoreError>>()?;
        Ok(reservations)
    }
}

fn to_db_count(value: u32, what: &str) -> Result<i32, CoreError> {
    i32::try_from(value).map_err(|_| CoreError::Validation(format!("{what} {value} is too large")))
}
