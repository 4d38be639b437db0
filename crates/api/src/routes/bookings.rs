//! Route definitions for the `/bookings` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// Routes mounted at `/bookings`.
///
/// ```text
/// POST   /                        -> create
/// GET    /availability            -> availability
/// GET    /slots                   -> slots
/// GET    /mine                    -> mine
/// GET    /owner                   -> owner
/// GET    /owner/report            -> owner_report
/// PUT    /{id}/status             -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(bookings::create))
        .route("/availability", get(bookings::availability))
        .route("/slots", get(bookings::slots))
        .route("/mine", get(bookings::mine))
        .route("/owner", get(bookings::owner))
        .route("/owner/report", get(bookings::owner_report))
        .route("/{id}/status", put(bookings::update_status))
}
