//! Administrative handlers: platform-wide booking and user management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sportsbook_core::error::CoreError;
use sportsbook_core::roles::{is_known_role, ROLE_USER};
use sportsbook_core::types::DbId;
use sportsbook_db::models::booking::BookingListing;
use sportsbook_db::models::user::UserResponse;
use sportsbook_db::repositories::{BookingRepo, UserRepo};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedQuery;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UserListQuery {
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if is_known_role(role) {
        Ok(())
    } else {
        Err(ValidationError::new("role").with_message("must be user, owner or admin".into()))
    }
}

/// GET /api/v1/admin/bookings
pub async fn list_bookings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookingListing>>> {
    Ok(Json(BookingRepo::list_all(&state.pool).await?))
}

/// DELETE /api/v1/admin/bookings/{id}
pub async fn delete_booking(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !BookingRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Booking",
            id,
        }));
    }
    tracing::info!(booking_id = id, admin_id = admin.user_id, "Booking removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/users?role=user|owner|admin
///
/// Defaults to `user` when no role is given.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UserListQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let role = query.role.as_deref().unwrap_or(ROLE_USER);
    let users = UserRepo::list_by_role(&state.pool, role).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Facilities, bookings and reviews of the user go with it.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Admins cannot delete their own account".into(),
        )));
    }
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    tracing::info!(user_id = id, admin_id = admin.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
