//! Handlers for the `/bookings` resource: admission, availability queries
//! and the booking lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sportsbook_core::availability::{
    first_offerable_hour, reported_occupancy, Availability, Reservation, Slot,
};
use sportsbook_core::booking::{can_set_status, BookingStatus};
use sportsbook_core::error::CoreError;
use sportsbook_core::timeslot::{format_24h, parse_hour, slot_label};
use sportsbook_core::types::{DbId, Hour};
use sportsbook_db::models::booking::{Booking, BookingListing, CreateBooking, OwnerReport};
use sportsbook_db::models::facility::FacilitySport;
use sportsbook_db::repositories::{BookingRepo, FacilityRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::handlers::facilities::find_facility;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireOwner};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /bookings`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub facility_id: DbId,
    pub sport_id: DbId,
    pub date: NaiveDate,
    /// `"14:00"` or `"2:00 PM"`.
    #[validate(length(min = 1, max = 16, message = "is required"))]
    pub time_slot: String,
    #[validate(range(min = 1, max = 5, message = "must be 1-5 hours"))]
    pub duration: u8,
    #[validate(range(min = 1, max = 1000, message = "must be 1-1000"))]
    pub number_of_resources: u32,
    #[validate(range(min = 1, max = 10000, message = "must be at least 1"))]
    pub number_of_people: u32,
    #[validate(length(min = 1, max = 30, message = "must be 1-30 characters"))]
    pub payment_mode: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub facility_id: DbId,
    pub sport_id: DbId,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    pub facility_id: DbId,
    pub sport_id: DbId,
    pub date: NaiveDate,
    #[serde(default = "one_u8")]
    #[validate(range(min = 1, max = 5, message = "must be 1-5 hours"))]
    pub duration: u8,
    #[serde(default = "one_u32")]
    #[validate(range(min = 1, max = 1000, message = "must be 1-1000"))]
    pub resources: u32,
}

fn one_u8() -> u8 {
    1
}

fn one_u32() -> u32 {
    1
}

/// Occupied units in one hour.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedHour {
    pub time_slot: String,
    pub booked_resources: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEntry {
    pub start_hour: Hour,
    pub time_slot: String,
    pub label: String,
    pub available: u32,
    pub bookable: bool,
}

#[derive(Debug, Serialize)]
pub struct SlotReport {
    pub capacity: u32,
    pub slots: Vec<SlotEntry>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/bookings
///
/// Runs admission under the offering's row lock and stores the booking as
/// `Confirmed`.
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let slot = Slot::new(parse_hour(&input.time_slot)?, input.duration)?;
    check_not_elapsed(input.date, &slot, now())?;

    let booking = BookingRepo::create_admitted(
        &state.pool,
        &CreateBooking {
            user_id: user.user_id,
            facility_id: input.facility_id,
            sport_id: input.sport_id,
            booking_date: input.date,
            slot,
            resource_count: input.number_of_resources,
            people_count: input.number_of_people,
            payment_mode: input.payment_mode.trim().to_string(),
        },
    )
    .await
    .inspect_err(|err| {
        tracing::debug!(
            user_id = user.user_id,
            facility_id = input.facility_id,
            sport_id = input.sport_id,
            error = %err,
            "Booking rejected"
        );
    })?;

    tracing::info!(
        booking_id = booking.id,
        user_id = user.user_id,
        facility_id = booking.facility_id,
        sport_id = booking.sport_id,
        date = %booking.booking_date,
        start_hour = booking.start_hour,
        duration = booking.duration_hours,
        resources = booking.resource_count,
        "Booking admitted"
    );
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/v1/bookings/availability?facilityId=&sportId=&date=
///
/// Booked units per occupied hour. For today, bookings that already ended
/// are left out.
pub async fn availability(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<AvailabilityQuery>,
) -> AppResult<Json<Vec<BookedHour>>> {
    load_offering(&state, query.facility_id, query.sport_id).await?;
    let reservations =
        load_reservations(&state, query.facility_id, query.sport_id, query.date).await?;

    let occupancy = reported_occupancy(&reservations, query.date, now());
    let hours = occupancy
        .iter()
        .map(|(hour, booked)| {
            let hour = Hour::try_from(hour)
                .map_err(|_| AppError::InternalError(format!("Hour {hour} out of range")))?;
            Ok(BookedHour {
                time_slot: format_24h(hour),
                booked_resources: booked,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(hours))
}

/// GET /api/v1/bookings/slots?facilityId=&sportId=&date=&duration=&resources=
pub async fn slots(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SlotQuery>,
) -> AppResult<Json<SlotReport>> {
    let offering = load_offering(&state, query.facility_id, query.sport_id).await?;
    let window = offering.operating_window()?;
    let reservations =
        load_reservations(&state, query.facility_id, query.sport_id, query.date).await?;

    let engine = Availability::new(offering.capacity(), &reservations);
    let report = engine.slot_report(&window, query.date, now(), query.duration, query.resources)?;

    let slots = report
        .into_iter()
        .map(|entry| SlotEntry {
            start_hour: entry.slot.start_hour(),
            time_slot: format_24h(entry.slot.start_hour()),
            label: slot_label(entry.slot.start_hour(), entry.slot.duration_hours()),
            available: entry.available,
            bookable: entry.bookable,
        })
        .collect();
    Ok(Json(SlotReport {
        capacity: engine.capacity(),
        slots,
    }))
}

/// GET /api/v1/bookings/mine
pub async fn mine(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookingListing>>> {
    Ok(Json(BookingRepo::list_for_user(&state.pool, user.user_id).await?))
}

/// GET /api/v1/bookings/owner
pub async fn owner(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookingListing>>> {
    Ok(Json(BookingRepo::list_for_owner(&state.pool, owner.user_id).await?))
}

/// GET /api/v1/bookings/owner/report
pub async fn owner_report(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
) -> AppResult<Json<OwnerReport>> {
    Ok(Json(BookingRepo::owner_report(&state.pool, owner.user_id).await?))
}

/// PUT /api/v1/bookings/{id}/status
///
/// Owners may confirm or cancel bookings at their own facilities. Admins may
/// set any status on any booking.
pub async fn update_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<Json<Booking>> {
    if !can_set_status(&user.role, input.status) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{}' cannot set a booking to {}",
            user.role, input.status
        ))));
    }

    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Booking",
            id,
        })
    };
    let booking = BookingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    if !user.is_admin() {
        let facility = find_facility(&state, booking.facility_id).await?;
        if facility.owner_id != user.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "Booking belongs to another owner's facility".into(),
            )));
        }
    }

    let updated = BookingRepo::update_status(&state.pool, id, input.status)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(
        booking_id = id,
        user_id = user.user_id,
        from = %booking.status,
        to = %updated.status,
        "Booking status changed"
    );
    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Reject dates in the past and, for today, slots that have already begun.
fn check_not_elapsed(date: NaiveDate, slot: &Slot, now: NaiveDateTime) -> Result<(), CoreError> {
    match first_offerable_hour(date, now) {
        None => Err(CoreError::Validation(format!(
            "Cannot book {date}: the date is in the past"
        ))),
        Some(earliest) if u32::from(slot.start_hour()) < earliest => {
            Err(CoreError::Validation(format!(
                "Time slot {} has already started",
                format_24h(slot.start_hour())
            )))
        }
        Some(_) => Ok(()),
    }
}

/// The capacity record, or 404 naming whichever of facility or offering is
/// missing.
async fn load_offering(
    state: &AppState,
    facility_id: DbId,
    sport_id: DbId,
) -> AppResult<FacilitySport> {
    if let Some(offering) = FacilityRepo::find_offering(&state.pool, facility_id, sport_id).await? {
        return Ok(offering);
    }
    find_facility(state, facility_id).await?;
    Err(AppError::Core(CoreError::NotFound {
        entity: "FacilitySport",
        id: sport_id,
    }))
}

async fn load_reservations(
    state: &AppState,
    facility_id: DbId,
    sport_id: DbId,
    date: NaiveDate,
) -> AppResult<Vec<Reservation>> {
    let bookings = BookingRepo::active_for_date(&state.pool, facility_id, sport_id, date).await?;
    let reservations = bookings
        .iter()
        .map(Booking::reservation)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(reservations)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn past_dates_are_refused() {
        let now = at("2026-10-18", "09:00:00");
        let slot = Slot::new(10, 1).unwrap();
        assert_matches!(
            check_not_elapsed(day("2026-10-17"), &slot, now),
            Err(CoreError::Validation(_))
        );
        assert!(check_not_elapsed(day("2026-10-19"), &Slot::new(0, 1).unwrap(), now).is_ok());
    }

    #[test]
    fn started_slots_today_are_refused() {
        let now = at("2026-10-18", "14:30:00");
        let date = day("2026-10-18");
        assert_matches!(
            check_not_elapsed(date, &Slot::new(14, 1).unwrap(), now),
            Err(CoreError::Validation(_))
        );
        assert!(check_not_elapsed(date, &Slot::new(15, 1).unwrap(), now).is_ok());
    }

    #[test]
    fn slot_on_the_hour_is_still_bookable() {
        let now = at("2026-10-18", "14:00:00");
        assert!(check_not_elapsed(day("2026-10-18"), &Slot::new(14, 2).unwrap(), now).is_ok());
    }

    #[test]
    fn booking_request_uses_camel_case_fields() {
        let body = serde_json::json!({
            "facilityId": 1,
            "sportId": 2,
            "date": "2026-10-20",
            "timeSlot": "2:00 PM",
            "duration": 2,
            "numberOfResources": 1,
            "numberOfPeople": 4,
            "paymentMode": "Cash",
        });
        let req: CreateBookingRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.facility_id, 1);
        assert_eq!(parse_hour(&req.time_slot).unwrap(), 14);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn slot_entry_serializes_camel_case() {
        let entry = SlotEntry {
            start_hour: 14,
            time_slot: format_24h(14),
            label: slot_label(14, 2),
            available: 3,
            bookable: true,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["startHour"], 14);
        assert_eq!(json["timeSlot"], "14:00");
        assert_eq!(json["label"], "2:00 PM to 4:00 PM");
    }
}
