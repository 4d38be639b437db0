//! Handlers for the `/facilities` resource and its sport offerings.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sportsbook_core::error::CoreError;
use sportsbook_core::operating::{OperatingDays, OperatingWindow};
use sportsbook_core::timeslot::parse_clock_hour;
use sportsbook_core::types::DbId;
use sportsbook_db::models::facility::{
    CreateFacility, Facility, FacilityDetail, FacilitySearch, FacilityWithSports, NewOffering,
    UpdateFacility,
};
use sportsbook_db::repositories::{FacilityRepo, ReviewRepo, SportRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOwner;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// One sport offering in a facility request.
///
/// Times accept `"06:00"`, `"6:00 AM"` or `"6"`; `closing_time` may be
/// `"24:00"` for a midnight close.
#[derive(Debug, Deserialize, Validate)]
pub struct OfferingRequest {
    pub sport_id: DbId,
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub price: i64,
    #[validate(range(min = 1, max = 1000, message = "must be 1-1000"))]
    pub resource_count: i32,
    #[validate(range(min = 1, max = 100, message = "must be 1-100"))]
    pub max_people_per_unit: i32,
    pub opening_time: String,
    pub closing_time: String,
    pub operating_days: Option<OperatingDays>,
}

/// Request body for `POST /facilities`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFacilityRequest {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 300, message = "must be 1-300 characters"))]
    pub address: String,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 30, message = "must be at most 30 characters"))]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub sports: Vec<OfferingRequest>,
}

/// Request body for `PUT /facilities/{id}`. All fields are optional; a
/// present `sports` list replaces every offering.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFacilityRequest {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 300, message = "must be 1-300 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 30, message = "must be at most 30 characters"))]
    pub contact_number: Option<String>,
    pub photos: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    #[validate(nested)]
    pub sports: Option<Vec<OfferingRequest>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/facilities
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<FacilityWithSports>>> {
    let facilities = FacilityRepo::list(&state.pool).await?;
    Ok(Json(FacilityRepo::with_sports(&state.pool, facilities).await?))
}

/// GET /api/v1/facilities/search?keyword=&location=&sport=&min_price=&max_price=
pub async fn search(
    State(state): State<AppState>,
    Query(filter): Query<FacilitySearch>,
) -> AppResult<Json<Vec<FacilityWithSports>>> {
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(AppError::Core(CoreError::Validation(
                "min_price cannot exceed max_price".into(),
            )));
        }
    }
    let facilities = FacilityRepo::search(&state.pool, &filter).await?;
    Ok(Json(FacilityRepo::with_sports(&state.pool, facilities).await?))
}

/// GET /api/v1/facilities/by-sport/{name}
pub async fn by_sport(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<FacilityWithSports>>> {
    let sport = SportRepo::find_by_name(&state.pool, &name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Sport '{name}' not found")))?;
    let facilities = FacilityRepo::list_by_sport(&state.pool, sport.id).await?;
    Ok(Json(FacilityRepo::with_sports(&state.pool, facilities).await?))
}

/// GET /api/v1/facilities/mine
pub async fn mine(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FacilityWithSports>>> {
    let facilities = FacilityRepo::list_by_owner(&state.pool, owner.user_id).await?;
    Ok(Json(FacilityRepo::with_sports(&state.pool, facilities).await?))
}

/// GET /api/v1/facilities/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<FacilityDetail>> {
    let facility = find_facility(&state, id).await?;
    let sports = FacilityRepo::offerings_for(&state.pool, &[id]).await?;
    let reviews = ReviewRepo::list_for_facility(&state.pool, id).await?;
    Ok(Json(FacilityDetail {
        facility,
        sports,
        reviews,
    }))
}

/// POST /api/v1/facilities
pub async fn create(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateFacilityRequest>,
) -> AppResult<(StatusCode, Json<FacilityWithSports>)> {
    let offerings = to_offerings(&input.sports)?;
    let facility = FacilityRepo::create(
        &state.pool,
        &CreateFacility {
            owner_id: owner.user_id,
            name: input.name.trim().to_string(),
            address: input.address.trim().to_string(),
            description: input.description,
            contact_number: input.contact_number,
            photos: input.photos,
            amenities: input.amenities,
            offerings,
        },
    )
    .await?;

    tracing::info!(
        facility_id = facility.id,
        owner_id = owner.user_id,
        "Facility created"
    );
    let sports = FacilityRepo::offerings_for(&state.pool, &[facility.id]).await?;
    Ok((StatusCode::CREATED, Json(FacilityWithSports { facility, sports })))
}

/// PUT /api/v1/facilities/{id}
///
/// Only the owning owner may update; admins may too.
pub async fn update(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateFacilityRequest>,
) -> AppResult<Json<FacilityWithSports>> {
    let existing = find_facility(&state, id).await?;
    ensure_can_manage(&owner, &existing)?;

    let offerings = input.sports.as_deref().map(to_offerings).transpose()?;
    let update = UpdateFacility {
        name: input.name.map(|n| n.trim().to_string()),
        address: input.address.map(|a| a.trim().to_string()),
        description: input.description,
        contact_number: input.contact_number,
        photos: input.photos,
        amenities: input.amenities,
        offerings,
    };
    let facility = FacilityRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Facility",
            id,
        }))?;

    tracing::info!(facility_id = id, user_id = owner.user_id, "Facility updated");
    let sports = FacilityRepo::offerings_for(&state.pool, &[id]).await?;
    Ok(Json(FacilityWithSports { facility, sports }))
}

/// DELETE /api/v1/facilities/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_facility(&state, id).await?;
    ensure_can_manage(&user, &existing)?;

    FacilityRepo::delete(&state.pool, id).await?;
    tracing::info!(facility_id = id, user_id = user.user_id, "Facility deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_facility(state: &AppState, id: DbId) -> AppResult<Facility> {
    FacilityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Facility",
            id,
        }))
}

/// Admins manage every facility; anyone else only their own.
fn ensure_can_manage(user: &AuthUser, facility: &Facility) -> AppResult<()> {
    if user.is_admin() || facility.owner_id == user.user_id {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You do not own this facility".into(),
        )))
    }
}

/// Parse times, check the window and reject duplicate sports.
fn to_offerings(requests: &[OfferingRequest]) -> Result<Vec<NewOffering>, CoreError> {
    let mut seen = HashSet::new();
    requests
        .iter()
        .map(|req| {
            if !seen.insert(req.sport_id) {
                return Err(CoreError::Validation(format!(
                    "Sport {} is listed more than once",
                    req.sport_id
                )));
            }
            let days = req.operating_days.unwrap_or(OperatingDays::AllDays);
            let window = OperatingWindow::new(
                parse_clock_hour(&req.opening_time)?,
                parse_clock_hour(&req.closing_time)?,
                days,
            )?;
            Ok(NewOffering {
                sport_id: req.sport_id,
                price: req.price,
                resource_count: req.resource_count,
                max_people_per_unit: req.max_people_per_unit,
                opening_hour: i16::from(window.opening_hour()),
                closing_hour: i16::from(window.closing_hour()),
                operating_days: days.as_str().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn offering(sport_id: DbId, open: &str, close: &str) -> OfferingRequest {
        OfferingRequest {
            sport_id,
            price: 400,
            resource_count: 3,
            max_people_per_unit: 4,
            opening_time: open.to_string(),
            closing_time: close.to_string(),
            operating_days: Some(OperatingDays::Weekends),
        }
    }

    #[test]
    fn offerings_accept_both_clock_forms() {
        let parsed = to_offerings(&[offering(1, "6:00 AM", "22:00")]).unwrap();
        assert_eq!(parsed[0].opening_hour, 6);
        assert_eq!(parsed[0].closing_hour, 22);
        assert_eq!(parsed[0].operating_days, "Sat-Sun");
        assert_eq!(parsed[0].max_people_per_unit, 4);
    }

    #[test]
    fn offerings_reject_inverted_window_and_duplicates() {
        assert_matches!(
            to_offerings(&[offering(1, "22:00", "06:00")]),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            to_offerings(&[offering(1, "06:00", "22:00"), offering(1, "07:00", "09:00")]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn only_owner_or_admin_manages() {
        let facility = Facility {
            id: 1,
            owner_id: 10,
            name: "Club".into(),
            address: "Addr".into(),
            description: None,
            contact_number: None,
            photos: vec![],
            amenities: vec![],
            average_rating: 0.0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let owner = AuthUser {
            user_id: 10,
            role: "owner".into(),
        };
        let other = AuthUser {
            user_id: 11,
            role: "owner".into(),
        };
        let admin = AuthUser {
            user_id: 99,
            role: "admin".into(),
        };
        assert!(ensure_can_manage(&owner, &facility).is_ok());
        assert!(ensure_can_manage(&admin, &facility).is_ok());
        assert_matches!(
            ensure_can_manage(&other, &facility),
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
    }
}
