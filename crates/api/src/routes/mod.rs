pub mod admin;
pub mod auth;
pub mod bookings;
pub mod facilities;
pub mod health;
pub mod sports;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                  register (public)
/// /auth/login                                     login (public)
///
/// /sports                                         list (public), create (admin)
/// /sports/{id}                                    update, delete (admin)
///
/// /facilities                                     list (public), create (owner)
/// /facilities/search                              filtered list (public)
/// /facilities/by-sport/{name}                     facilities offering a sport
/// /facilities/mine                                caller's facilities (owner)
/// /facilities/{id}                                detail (public), update, delete
/// /facilities/{id}/reviews                        add review (any user)
/// /facilities/{id}/reviews/{review_id}            remove review (admin)
///
/// /bookings                                       create (any user)
/// /bookings/availability                          booked units per hour (public)
/// /bookings/slots                                 bookable slot grid (public)
/// /bookings/mine                                  caller's bookings
/// /bookings/owner                                 bookings at caller's facilities
/// /bookings/owner/report                          booking totals and revenue
/// /bookings/{id}/status                           status transition (PUT)
///
/// /admin/bookings                                 all bookings (admin)
/// /admin/bookings/{id}                            remove booking
/// /admin/users                                    list users by role
/// /admin/users/{id}                               delete user
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/sports", sports::router())
        .nest("/facilities", facilities::router())
        .nest("/bookings", bookings::router())
        .nest("/admin", admin::router())
}
