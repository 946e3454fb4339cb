//! In-memory implementations of the store and transport contracts.
//!
//! Data lives for the lifetime of the process. A seed file can populate the
//! stores at startup, but nothing is ever written back.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{PortalError, PortalResult};
use crate::event::{Event, EventDraft, EventId};
use crate::notify::Notification;
use crate::profile::{Identity, UserId, UserProfile};
use crate::store::{EventStore, IdentityStore, NotificationTransport, ProfileStore};

#[derive(Default)]
pub struct MemoryIdentityStore {
    users: RwLock<Vec<Identity>>,
}

impl MemoryIdentityStore {
    pub fn new(users: Vec<Identity>) -> Self {
        MemoryIdentityStore {
            users: RwLock::new(users),
        }
    }

    pub async fn register(&self, identity: Identity) {
        let mut users = self.users.write().await;
        users.retain(|u| u.id != identity.id);
        users.push(identity);
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn current_user(&self, user_id: &UserId) -> PortalResult<Option<Identity>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| &u.id == user_id).cloned())
    }

    async fn list_users(&self) -> PortalResult<Vec<Identity>> {
        Ok(self.users.read().await.clone())
    }
}

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new(profiles: Vec<UserProfile>) -> Self {
        MemoryProfileStore {
            profiles: RwLock::new(profiles.into_iter().map(|p| (p.id.clone(), p)).collect()),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user_id: &UserId) -> PortalResult<UserProfile> {
        self.profiles
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or(PortalError::ProfileNotFound)
    }

    async fn upsert(&self, profile: UserProfile) -> PortalResult<UserProfile> {
        let mut profiles = self.profiles.write().await;

        let taken = profiles.values().any(|other| {
            other.id != profile.id && other.username.eq_ignore_ascii_case(&profile.username)
        });
        if taken {
            return Err(PortalError::UsernameTaken(profile.username));
        }

        profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn list(&self) -> PortalResult<Vec<UserProfile>> {
        let mut all: Vec<UserProfile> = self.profiles.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<HashMap<EventId, Event>>,
}

impl MemoryEventStore {
    pub fn new(events: Vec<Event>) -> Self {
        MemoryEventStore {
            events: RwLock::new(events.into_iter().map(|e| (e.id, e)).collect()),
        }
    }
}

/// Latest start first; events without a start go last, newest created first.
fn by_start_descending(a: &Event, b: &Event) -> Ordering {
    match (a.start, b.start) {
        (Some(a_start), Some(b_start)) => b_start.cmp(&a_start),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.created_at.cmp(&a.created_at),
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: Event) -> PortalResult<Event> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Err(PortalError::Store(format!("Event {} already exists", event.id)));
        }
        events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update(&self, id: EventId, draft: EventDraft) -> PortalResult<Event> {
        let mut events = self.events.write().await;
        let event = events.get_mut(&id).ok_or(PortalError::EventNotFound(id))?;
        event.apply(draft);
        Ok(event.clone())
    }

    async fn get(&self, id: EventId) -> PortalResult<Event> {
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(PortalError::EventNotFound(id))
    }

    async fn list(&self) -> PortalResult<Vec<Event>> {
        let mut all: Vec<Event> = self.events.read().await.values().cloned().collect();
        all.sort_by(by_start_descending);
        Ok(all)
    }
}

/// Transport that keeps every notification in memory instead of delivering it.
#[derive(Default)]
pub struct Outbox {
    sent: RwLock<Vec<Notification>>,
}

impl Outbox {
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl NotificationTransport for Outbox {
    async fn send(&self, notification: Notification) -> PortalResult<()> {
        info!(
            sender = notification.sender.as_deref().unwrap_or("default"),
            subject = %notification.subject,
            recipients = notification.recipients.len(),
            "notification queued in outbox"
        );
        self.sent.write().await.push(notification);
        Ok(())
    }
}

/// Initial contents for the in-memory stores.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<Identity>,
    #[serde(default)]
    pub profiles: Vec<UserProfile>,
    #[serde(default)]
    pub events: Vec<SeedEvent>,
}

#[derive(Debug, Deserialize)]
pub struct SeedEvent {
    pub created_by: UserId,
    #[serde(flatten)]
    pub draft: EventDraft,
}

impl Seed {
    pub fn load(path: &Path) -> PortalResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let seed = Self::parse(&content)?;
        info!(
            path = %path.display(),
            users = seed.users.len(),
            profiles = seed.profiles.len(),
            events = seed.events.len(),
            "loaded seed data"
        );
        Ok(seed)
    }

    pub fn parse(content: &str) -> PortalResult<Self> {
        toml::from_str(content).map_err(|e| PortalError::Config(format!("Invalid seed file: {e}")))
    }

    /// Seeded events go through the same validation as authored ones.
    pub fn into_stores(
        self,
    ) -> PortalResult<(MemoryIdentityStore, MemoryProfileStore, MemoryEventStore)> {
        let now = Utc::now();
        let events = self
            .events
            .into_iter()
            .map(|seed| Ok(Event::from_draft(seed.draft.validated()?, seed.created_by, now)))
            .collect::<PortalResult<Vec<_>>>()?;

        let profiles = self
            .profiles
            .into_iter()
            .map(|mut profile| {
                profile.normalize();
                profile
            })
            .collect();

        Ok((
            MemoryIdentityStore::new(self.users),
            MemoryProfileStore::new(profiles),
            MemoryEventStore::new(events),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Role;
    use chrono::{Duration, TimeZone};

    fn profile(id: &str, username: &str) -> UserProfile {
        UserProfile::new(UserId::new(id), username, Role::Student)
    }

    #[tokio::test]
    async fn test_username_conflict() {
        let store = MemoryProfileStore::default();
        store.upsert(profile("a", "juan")).await.unwrap();

        let result = store.upsert(profile("b", "Juan")).await;
        assert!(matches!(result, Err(PortalError::UsernameTaken(name)) if name == "Juan"));

        // Re-saving your own username is fine.
        store.upsert(profile("a", "juan")).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_replaces_identity() {
        let store = MemoryIdentityStore::default();
        let id = UserId::new("u1");

        store
            .register(Identity {
                id: id.clone(),
                email: "old@gmail.com".into(),
            })
            .await;
        store
            .register(Identity {
                id: id.clone(),
                email: "new@student.dmmmsu.edu.ph".into(),
            })
            .await;

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        let current = store.current_user(&id).await.unwrap().unwrap();
        assert_eq!(current.email, "new@student.dmmmsu.edu.ph");
        assert!(store.current_user(&UserId::new("u2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let store = MemoryProfileStore::default();
        let result = store.get(&UserId::new("ghost")).await;
        assert!(matches!(result, Err(PortalError::ProfileNotFound)));
    }

    #[tokio::test]
    async fn test_events_listed_latest_start_first() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let author = UserId::new("author");

        let make = |title: &str, offset: Option<i64>| {
            let mut draft = EventDraft::new(title);
            draft.start = offset.map(|days| base + Duration::days(days));
            Event::from_draft(draft, author.clone(), base)
        };

        let store = MemoryEventStore::new(vec![
            make("early", Some(1)),
            make("undated", None),
            make("late", Some(10)),
        ]);

        let titles: Vec<String> = store.list().await.unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["late", "early", "undated"]);
    }

    #[tokio::test]
    async fn test_update_missing_event() {
        let store = MemoryEventStore::default();
        let id = EventId::generate();
        let result = store.update(id, EventDraft::new("x")).await;
        assert!(matches!(result, Err(PortalError::EventNotFound(missing)) if missing == id));
    }

    #[test]
    fn test_seed_parse() {
        let seed = Seed::parse(
            r#"
[[users]]
id = "u1"
email = "juan@student.dmmmsu.edu.ph"

[[profiles]]
id = "u1"
username = "juan"
role = "student"
unit = "CCS"
year = 1
section = "A"

[[events]]
created_by = "u1"
title = "Freshmen orientation"
start = "2025-06-01T01:00:00Z"
end = "2025-06-01T04:00:00Z"

[events.targeting]
roles = ["student"]
year_levels = [1]
"#,
        )
        .unwrap();

        assert_eq!(seed.users.len(), 1);
        assert_eq!(seed.profiles[0].year.map(|y| y.get()), Some(1));
        assert_eq!(seed.events[0].draft.targeting.roles.len(), 1);
    }

    #[test]
    fn test_seed_rejects_invalid_events() {
        let seed = Seed::parse(
            r#"
[[events]]
created_by = "u1"
title = "Backwards"
start = "2025-06-01T04:00:00Z"
end = "2025-06-01T01:00:00Z"
"#,
        )
        .unwrap();

        assert!(matches!(seed.into_stores(), Err(PortalError::Validation(_))));
    }
}
