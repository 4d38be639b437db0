//! Handlers for the `/sports` catalog.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sportsbook_core::error::CoreError;
use sportsbook_core::types::DbId;
use sportsbook_db::models::sport::{CreateSport, Sport, UpdateSport};
use sportsbook_db::repositories::SportRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Request body for creating a sport.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSportRequest {
    #[validate(length(min = 1, max = 60, message = "must be 1-60 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "must be a URL"))]
    pub image_url: Option<String>,
}

/// Request body for updating a sport. All fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSportRequest {
    #[validate(length(min = 1, max = 60, message = "must be 1-60 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "must be a URL"))]
    pub image_url: Option<String>,
}

/// GET /api/v1/sports
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Sport>>> {
    let sports = SportRepo::list(&state.pool).await?;
    Ok(Json(sports))
}

/// POST /api/v1/sports
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateSportRequest>,
) -> AppResult<(StatusCode, Json<Sport>)> {
    let sport = SportRepo::create(
        &state.pool,
        &CreateSport {
            name: input.name.trim().to_string(),
            description: input.description,
            image_url: input.image_url,
        },
    )
    .await?;
    tracing::info!(sport_id = sport.id, admin_id = admin.user_id, "Sport created");
    Ok((StatusCode::CREATED, Json(sport)))
}

/// PUT /api/v1/sports/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateSportRequest>,
) -> AppResult<Json<Sport>> {
    let update = UpdateSport {
        name: input.name.map(|n| n.trim().to_string()),
        description: input.description,
        image_url: input.image_url,
    };
    let sport = SportRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sport",
            id,
        }))?;
    Ok(Json(sport))
}

/// DELETE /api/v1/sports/{id}
///
/// Refused with 400 while any facility still offers the sport.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SportRepo::delete(&state.pool, id).await? {
        tracing::info!(sport_id = id, admin_id = admin.user_id, "Sport deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Sport",
            id,
        }))
    }
}
