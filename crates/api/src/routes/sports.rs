//! Route definitions for the `/sports` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::sports;
use crate::state::AppState;

/// Routes mounted at `/sports`.
///
/// Writes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sports::list).post(sports::create))
        .route("/{id}", put(sports::update).delete(sports::delete))
}
