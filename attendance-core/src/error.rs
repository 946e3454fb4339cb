//! Error types for the attendance portal.

use thiserror::Error;

use crate::event::EventId;

/// Errors that can occur in portal operations.
///
/// Every operation is scoped to one user action, so none of these are fatal
/// once the process has started.
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Time source unavailable: {0}")]
    TimeSourceUnavailable(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Notification transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortalError {
    /// Message suitable for showing to the person who triggered the action.
    pub fn user_message(&self) -> String {
        match self {
            PortalError::NotAuthenticated => "Please log in to continue.".to_string(),
            PortalError::ProfileNotFound => {
                "Your profile is not set up yet. Please complete it first.".to_string()
            }
            PortalError::EventNotFound(_) => {
                "Event not found or you do not have permission to edit it.".to_string()
            }
            PortalError::PermissionDenied(reason) => reason.clone(),
            PortalError::UsernameTaken(_) => {
                "This username is already taken. Please choose another one.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for portal operations.
pub type PortalResult<T> = Result<T, PortalError>;
