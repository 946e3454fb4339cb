//! Account and event authoring rules on top of the stores.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PortalError, PortalResult};
use crate::event::{Event, EventDraft, EventId};
use crate::profile::{Identity, Role, Section, Unit, UserId, UserProfile, YearLevel};
use crate::role::{DerivedRole, DomainConfig};
use crate::store::{EventStore, ProfileStore};

/// What the account screen shows for a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileView {
    Existing { profile: UserProfile },
    /// No profile yet; the user has to fill one in before using the portal.
    FirstTimeSetup { setup: ProfileSetup },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSetup {
    pub derived: DerivedRole,
    /// Preselected role, when the email address leaves no choice.
    pub role: Option<Role>,
    pub allowed_roles: Vec<Role>,
}

impl ProfileSetup {
    fn for_derived(derived: DerivedRole) -> Self {
        ProfileSetup {
            derived,
            role: derived.fixed_role(),
            allowed_roles: derived.allowed_roles().to_vec(),
        }
    }
}

/// Fields a user may edit on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Ignored for students and guests, whose role comes from their email address.
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub year: Option<YearLevel>,
    #[serde(default)]
    pub section: Option<Section>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub photo_consent: bool,
    #[serde(default)]
    pub social_media_consent: bool,
}

#[derive(Clone)]
pub struct AccountService {
    profiles: Arc<dyn ProfileStore>,
    domains: DomainConfig,
}

impl AccountService {
    pub fn new(profiles: Arc<dyn ProfileStore>, domains: DomainConfig) -> Self {
        AccountService { profiles, domains }
    }

    pub async fn load(&self, identity: &Identity) -> PortalResult<ProfileView> {
        match self.profiles.get(&identity.id).await {
            Ok(profile) => Ok(ProfileView::Existing { profile }),
            Err(PortalError::ProfileNotFound) => Ok(ProfileView::FirstTimeSetup {
                setup: ProfileSetup::for_derived(self.domains.derive(&identity.email)),
            }),
            Err(e) => Err(e),
        }
    }

    /// Create or update the caller's own profile.
    ///
    /// Students and guests get the role their email implies; employees must
    /// choose faculty or staff. Permission flags are never taken from the form.
    pub async fn save(&self, identity: &Identity, form: ProfileForm) -> PortalResult<UserProfile> {
        let username = form.username.trim().to_string();
        if username.is_empty() {
            return Err(PortalError::Validation("Username is required".into()));
        }

        let derived = self.domains.derive(&identity.email);
        let role = match derived.fixed_role() {
            Some(role) => role,
            None => form
                .role
                .filter(|role| derived.allowed_roles().contains(role))
                .ok_or_else(|| {
                    PortalError::Validation("Please select a role: faculty or staff".into())
                })?,
        };

        let (can_create_events, is_admin) = match self.profiles.get(&identity.id).await {
            Ok(existing) => (existing.can_create_events, existing.is_admin),
            Err(PortalError::ProfileNotFound) => (false, false),
            Err(e) => return Err(e),
        };

        let mut profile = UserProfile {
            id: identity.id.clone(),
            username,
            first_name: form.first_name,
            last_name: form.last_name,
            role,
            unit: form.unit,
            year: form.year,
            section: form.section,
            position: form.position,
            can_create_events,
            is_admin,
            photo_consent: form.photo_consent,
            social_media_consent: form.social_media_consent,
            updated_at: Some(Utc::now()),
        };
        profile.normalize();

        let saved = self.profiles.upsert(profile).await?;
        info!(user = %saved.id, role = %saved.role, "profile saved");
        Ok(saved)
    }

    /// Every profile, ordered by last name. Admins only.
    pub async fn list_profiles(&self, requester: &UserId) -> PortalResult<Vec<UserProfile>> {
        self.require_admin(requester).await?;

        let mut profiles = self.profiles.list().await?;
        profiles.sort_by(|a, b| {
            let key = |p: &UserProfile| (p.last_name.is_none(), p.last_name.clone(), p.username.clone());
            key(a).cmp(&key(b))
        });
        Ok(profiles)
    }

    /// Grant or revoke the right to create events. Admins only.
    pub async fn set_can_create_events(
        &self,
        requester: &UserId,
        target: &UserId,
        allowed: bool,
    ) -> PortalResult<UserProfile> {
        self.require_admin(requester).await?;

        let mut profile = self.profiles.get(target).await?;
        profile.can_create_events = allowed;
        profile.updated_at = Some(Utc::now());

        let saved = self.profiles.upsert(profile).await?;
        info!(admin = %requester, user = %target, allowed, "event creation permission changed");
        Ok(saved)
    }

    async fn require_admin(&self, requester: &UserId) -> PortalResult<()> {
        match self.profiles.get(requester).await {
            Ok(profile) if profile.is_admin => Ok(()),
            Ok(_) | Err(PortalError::ProfileNotFound) => Err(PortalError::PermissionDenied(
                "Only administrators can manage user permissions.".into(),
            )),
            Err(e) => Err(e),
        }
    }
}

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        EventService { events, profiles }
    }

    pub async fn list(&self) -> PortalResult<Vec<Event>> {
        self.events.list().await
    }

    pub async fn get(&self, id: EventId) -> PortalResult<Event> {
        self.events.get(id).await
    }

    /// Create an event. The author needs the event-creation permission.
    pub async fn create(&self, author: &UserId, draft: EventDraft) -> PortalResult<Event> {
        let allowed = match self.profiles.get(author).await {
            Ok(profile) => profile.can_create_events,
            Err(PortalError::ProfileNotFound) => false,
            Err(e) => return Err(e),
        };
        if !allowed {
            return Err(PortalError::PermissionDenied(
                "You do not have permission to create events.".into(),
            ));
        }

        let draft = draft.validated()?;
        let event = self
            .events
            .insert(Event::from_draft(draft, author.clone(), Utc::now()))
            .await?;

        info!(event = %event.id, author = %author, audience = %event.targeting.describe(), "event created");
        Ok(event)
    }

    /// Edit an event. Only its creator may do this.
    pub async fn update(&self, author: &UserId, id: EventId, draft: EventDraft) -> PortalResult<Event> {
        let existing = self.events.get(id).await?;
        if !existing.is_created_by(author) {
            return Err(PortalError::PermissionDenied(
                "You do not have permission to edit this event.".into(),
            ));
        }

        let draft = draft.validated()?;
        let event = self.events.update(id, draft).await?;

        info!(event = %event.id, audience = %event.targeting.describe(), "event updated");
        Ok(event)
    }
}
