//! Event listing and authoring endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};

use attendance_core::{Event, EventDraft, EventId};

use crate::routes::notify::spawn_dispatch;
use crate::routes::{AppError, CurrentUser, JsonBody};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", put(update_event))
}

/// GET /events - Every event, latest start first
///
/// Audience filtering happens on the client, which knows the viewer's profile.
async fn list_events(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.events.list().await?))
}

/// POST /events - Create an event and notify its audience in the background
async fn create_event(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    JsonBody(draft): JsonBody<EventDraft>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.events.create(&identity.id, draft).await?;
    spawn_dispatch(&state, event.id);
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /events/:id - Edit an event (creator only) and re-notify its audience
async fn update_event(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
    JsonBody(draft): JsonBody<EventDraft>,
) -> Result<Json<Event>, AppError> {
    let id: EventId = id.parse()?;
    let event = state.events.update(&identity.id, id, draft).await?;
    spawn_dispatch(&state, event.id);
    Ok(Json(event))
}
