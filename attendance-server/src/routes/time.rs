//! Trusted clock endpoint

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/time", get(server_time))
}

#[derive(Serialize, Deserialize)]
pub struct TimeResponse {
    pub now: DateTime<Utc>,
}

/// GET /time - The server's clock, used by clients to correct their own
async fn server_time(State(state): State<AppState>) -> Result<Json<TimeResponse>, AppError> {
    let now = state.clock.now().await?;
    Ok(Json(TimeResponse { now }))
}
