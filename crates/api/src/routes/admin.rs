//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /bookings                -> list_bookings
/// DELETE /bookings/{id}           -> delete_booking
/// GET    /users                   -> list_users
/// DELETE /users/{id}              -> delete_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(admin::list_bookings))
        .route("/bookings/{id}", delete(admin::delete_booking))
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
}
