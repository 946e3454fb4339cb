//! Contracts for the external collaborators the portal runs against.
//!
//! Stores are constructed once at startup and handed to whoever needs them as
//! `Arc<dyn ...>` values. Nothing in this crate reaches for a global client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PortalResult;
use crate::event::{Event, EventDraft, EventId};
use crate::notify::Notification;
use crate::profile::{Identity, UserId, UserProfile};

/// Who is signed in. Authentication itself happens elsewhere.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve a session's user id, `None` when there is no such user.
    async fn current_user(&self, user_id: &UserId) -> PortalResult<Option<Identity>>;

    /// Every registered user, used to compute notification audiences.
    async fn list_users(&self) -> PortalResult<Vec<Identity>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fails with `ProfileNotFound` when the user has not set up a profile yet.
    async fn get(&self, user_id: &UserId) -> PortalResult<UserProfile>;

    /// Insert or replace. Fails with `UsernameTaken` when another user owns the username.
    async fn upsert(&self, profile: UserProfile) -> PortalResult<UserProfile>;

    async fn list(&self) -> PortalResult<Vec<UserProfile>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: Event) -> PortalResult<Event>;

    /// Replace the editable fields of an existing event.
    async fn update(&self, id: EventId, draft: EventDraft) -> PortalResult<Event>;

    /// Fails with `EventNotFound` when there is no such event.
    async fn get(&self, id: EventId) -> PortalResult<Event>;

    /// All events, latest start first. Events without a start come last.
    async fn list(&self) -> PortalResult<Vec<Event>>;
}

/// The authoritative source of "now".
#[async_trait]
pub trait TrustedClock: Send + Sync {
    async fn now(&self) -> PortalResult<DateTime<Utc>>;
}

/// Best-effort delivery of a notification to its recipients.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send(&self, notification: Notification) -> PortalResult<()>;
}
