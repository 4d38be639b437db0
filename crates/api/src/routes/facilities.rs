//! Route definitions for the `/facilities` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{facilities, reviews};
use crate::state::AppState;

/// Routes mounted at `/facilities`.
///
/// Static segments (`/search`, `/mine`) are matched before `/{id}`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /search                        -> search
/// GET    /by-sport/{name}               -> by_sport
/// GET    /mine                          -> mine
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
/// POST   /{id}/reviews                  -> reviews::create
/// DELETE /{id}/reviews/{review_id}      -> reviews::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(facilities::list).post(facilities::create))
        .route("/search", get(facilities::search))
        .route("/by-sport/{name}", get(facilities::by_sport))
        .route("/mine", get(facilities::mine))
        .route(
            "/{id}",
            get(facilities::get_by_id)
                .put(facilities::update)
                .delete(facilities::delete),
        )
        .route("/{id}/reviews", post(reviews::create))
        .route("/{id}/reviews/{review_id}", delete(reviews::delete))
}
