pub mod admin;
pub mod events;
pub mod notify;
pub mod profiles;
pub mod time;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use attendance_core::{Identity, PortalError, UserId};

use crate::state::AppState;

/// Header carrying the signed-in user's id.
pub const USER_HEADER: &str = "x-user-id";

/// Standard API error response
#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert anyhow errors to HTTP responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            return rejection.status();
        }

        match self.0.downcast_ref::<PortalError>() {
            Some(PortalError::NotAuthenticated) => StatusCode::UNAUTHORIZED,
            Some(PortalError::ProfileNotFound | PortalError::EventNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Some(PortalError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
            Some(PortalError::UsernameTaken(_)) => StatusCode::CONFLICT,
            Some(PortalError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(PortalError::Transport(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
            "Something went wrong. Please try again later.".to_string()
        } else if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            rejection.body_text()
        } else {
            match self.0.downcast_ref::<PortalError>() {
                Some(e) => e.user_message(),
                None => self.0.to_string(),
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// `Json` request body whose rejections come back as an `ErrorResponse`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// The caller, resolved from the `x-user-id` header against the identity store.
pub struct CurrentUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(PortalError::NotAuthenticated)?;

        let identity = state
            .identities
            .current_user(&UserId::new(user_id))
            .await?
            .ok_or(PortalError::NotAuthenticated)?;

        Ok(CurrentUser(identity))
    }
}
