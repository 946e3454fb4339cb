//! Notification dispatch endpoint

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use attendance_core::EventId;
use attendance_core::notify::DispatchOutcome;

use crate::routes::{AppError, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/events/{id}/notify", post(notify_event))
}

#[derive(Serialize, Deserialize)]
pub struct NotifyResponse {
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
    pub message: String,
}

/// POST /events/:id/notify - Notify the event's audience now
async fn notify_event(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<NotifyResponse>, AppError> {
    let id: EventId = id.parse()?;
    info!(event = %id, requested_by = %identity.id, "notification requested");

    let outcome = state.dispatcher.dispatch(id).await?;
    Ok(Json(NotifyResponse {
        message: outcome.message(),
        outcome,
    }))
}

/// Dispatch in the background. Failures are logged and never reach the author.
pub(crate) fn spawn_dispatch(state: &AppState, id: EventId) {
    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        match dispatcher.dispatch(id).await {
            Ok(outcome) => info!(event = %id, result = %outcome.message(), "background dispatch finished"),
            Err(e) => warn!(event = %id, error = %e, "background dispatch failed"),
        }
    });
}
