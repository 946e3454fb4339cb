//! Events and the drafts they are authored from.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PortalError, PortalResult};
use crate::profile::UserId;
use crate::targeting::TargetingCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn generate() -> Self {
        EventId(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(EventId)
            .map_err(|_| PortalError::Validation(format!("Invalid event id '{s}'")))
    }
}

/// A stored event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    /// Either instant may be missing on older rows; status is then `InfoMissing`.
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub targeting: TargetingCriteria,
}

impl Event {
    /// Build a new event from a validated draft.
    pub fn from_draft(draft: EventDraft, created_by: UserId, created_at: DateTime<Utc>) -> Self {
        Event {
            id: EventId::generate(),
            title: draft.title,
            description: draft.description,
            start: draft.start,
            end: draft.end,
            location: draft.location,
            created_by,
            created_at,
            targeting: draft.targeting,
        }
    }

    /// Overwrite the editable fields. Id, creator and creation time never change.
    pub fn apply(&mut self, draft: EventDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.start = draft.start;
        self.end = draft.end;
        self.location = draft.location;
        self.targeting = draft.targeting;
    }

    pub fn is_created_by(&self, user: &UserId) -> bool {
        &self.created_by == user
    }
}

/// The author-editable part of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub targeting: TargetingCriteria,
}

impl EventDraft {
    pub fn new(title: impl Into<String>) -> Self {
        EventDraft {
            title: title.into(),
            description: None,
            start: None,
            end: None,
            location: None,
            targeting: TargetingCriteria::public(),
        }
    }

    /// Check the draft and return it with blank strings dropped and targeting normalized.
    pub fn validated(mut self) -> PortalResult<Self> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(PortalError::Validation("Event title is required".into()));
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end <= start {
                return Err(PortalError::Validation(
                    "Event end time must be after its start time".into(),
                ));
            }
        }

        self.description = non_blank(self.description);
        self.location = non_blank(self.location);
        self.targeting = self.targeting.normalized();

        Ok(self)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
