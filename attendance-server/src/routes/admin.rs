//! Admin endpoints for managing who may create events

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

use attendance_core::{UserId, UserProfile};

use crate::routes::{AppError, CurrentUser, JsonBody};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/profiles", get(list_profiles))
        .route("/admin/profiles/{id}/can-create", put(set_can_create))
}

/// GET /admin/profiles - All profiles ordered by last name
async fn list_profiles(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    Ok(Json(state.accounts.list_profiles(&identity.id).await?))
}

/// Request body for granting or revoking event creation
#[derive(Serialize, Deserialize)]
pub struct CanCreateRequest {
    pub allowed: bool,
}

/// PUT /admin/profiles/:id/can-create
async fn set_can_create(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(target): Path<String>,
    JsonBody(req): JsonBody<CanCreateRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .accounts
        .set_can_create_events(&identity.id, &UserId::new(target), req.allowed)
        .await?;
    Ok(Json(profile))
}
