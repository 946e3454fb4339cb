//! Identity and own-profile endpoints

use axum::{Json, Router, extract::State, routing::get};

use attendance_core::{Identity, UserProfile};
use attendance_core::service::{ProfileForm, ProfileView};

use crate::routes::{AppError, CurrentUser, JsonBody};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/profile", get(get_profile).put(save_profile))
}

/// GET /me - Who the caller is
async fn me(CurrentUser(identity): CurrentUser) -> Json<Identity> {
    Json(identity)
}

/// GET /profile - The caller's profile, or what first-time setup should offer
async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ProfileView>, AppError> {
    Ok(Json(state.accounts.load(&identity).await?))
}

/// PUT /profile - Create or update the caller's profile
async fn save_profile(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    JsonBody(form): JsonBody<ProfileForm>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.accounts.save(&identity, form).await?))
}
