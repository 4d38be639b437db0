//! Handlers for facility reviews.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sportsbook_core::error::CoreError;
use sportsbook_core::types::DbId;
use sportsbook_db::models::review::{CreateReview, Review};
use sportsbook_db::repositories::ReviewRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::handlers::facilities::find_facility;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Request body for `POST /facilities/{id}/reviews`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "must be 1-5"))]
    pub rating: i16,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// POST /api/v1/facilities/{id}/reviews
///
/// A second review by the same user hits `uq_reviews_facility_user` and
/// surfaces as 409.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Path(facility_id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    find_facility(&state, facility_id).await?;

    let review = ReviewRepo::create(
        &state.pool,
        &CreateReview {
            facility_id,
            user_id: user.user_id,
            rating: input.rating,
            comment: input
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        },
    )
    .await?;

    tracing::info!(
        review_id = review.id,
        facility_id,
        user_id = user.user_id,
        "Review added"
    );
    Ok((StatusCode::CREATED, Json(review)))
}

/// DELETE /api/v1/facilities/{id}/reviews/{review_id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((facility_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !ReviewRepo::delete(&state.pool, facility_id, review_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id: review_id,
        }));
    }
    tracing::info!(review_id, facility_id, admin_id = admin.user_id, "Review removed");
    Ok(StatusCode::NO_CONTENT)
}
