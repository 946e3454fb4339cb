//! Server-side notification dispatch.
//!
//! Recipients are chosen with the same audience rules the dashboard uses,
//! applied to every known user with the creator override turned off.

use std::collections::HashMap;
use std::sync::Arc;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audience;
use crate::error::PortalResult;
use crate::event::{Event, EventId};
use crate::profile::{UserId, UserProfile};
use crate::store::{EventStore, IdentityStore, NotificationTransport, ProfileStore};

/// A message handed to the notification transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// From address; the transport's own default when unset.
    pub sender: Option<String>,
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Public events are announced on the dashboard only.
    PublicEvent,
    NoRecipients,
    Sent { count: usize },
}

impl DispatchOutcome {
    pub fn message(&self) -> String {
        match self {
            DispatchOutcome::PublicEvent => {
                "This is a public event; no notifications were sent.".to_string()
            }
            DispatchOutcome::NoRecipients => "No target users found for this event.".to_string(),
            DispatchOutcome::Sent { count } => format!("Email sent to {count} users."),
        }
    }
}

pub struct Dispatcher {
    events: Arc<dyn EventStore>,
    identities: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileStore>,
    transport: Arc<dyn NotificationTransport>,
    timezone: Tz,
    sender: Option<String>,
}

impl Dispatcher {
    pub fn new(
        events: Arc<dyn EventStore>,
        identities: Arc<dyn IdentityStore>,
        profiles: Arc<dyn ProfileStore>,
        transport: Arc<dyn NotificationTransport>,
        timezone: Tz,
    ) -> Self {
        Dispatcher {
            events,
            identities,
            profiles,
            transport,
            timezone,
            sender: None,
        }
    }

    /// Address notifications are sent from.
    pub fn with_sender(mut self, sender: Option<String>) -> Self {
        self.sender = sender;
        self
    }

    /// Notify everyone targeted by the event.
    pub async fn dispatch(&self, event_id: EventId) -> PortalResult<DispatchOutcome> {
        let event = self.events.get(event_id).await?;

        if event.targeting.is_public() {
            info!(event = %event.id, "event is public, no notifications sent");
            return Ok(DispatchOutcome::PublicEvent);
        }

        let recipients = self.audience(&event).await?;
        if recipients.is_empty() {
            info!(event = %event.id, "no target users found");
            return Ok(DispatchOutcome::NoRecipients);
        }

        let count = recipients.len();
        let mut notification = compose(&event, recipients, self.timezone);
        notification.sender = self.sender.clone();
        self.transport.send(notification).await?;

        info!(event = %event.id, count, "notification sent");
        Ok(DispatchOutcome::Sent { count })
    }

    /// Addresses that a dispatch for `event` would reach.
    pub async fn audience(&self, event: &Event) -> PortalResult<Vec<String>> {
        if event.targeting.is_public() {
            return Ok(Vec::new());
        }

        let users = self.identities.list_users().await?;
        let profiles: HashMap<UserId, UserProfile> = self
            .profiles
            .list()
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let population = users.iter().map(|user| (user, profiles.get(&user.id)));
        Ok(audience::recipients(&event.targeting, population))
    }
}

/// Build the email for `event`, with the start time shown in `timezone`.
pub fn compose(event: &Event, recipients: Vec<String>, timezone: Tz) -> Notification {
    let when = event
        .start
        .map(|start| {
            start
                .with_timezone(&timezone)
                .format("%-m/%-d/%Y, %-I:%M:%S %p")
                .to_string()
        })
        .unwrap_or_else(|| "TBD".to_string());

    let title = escape_html(&event.title);
    let description = escape_html(event.description.as_deref().unwrap_or("N/A"));
    let location = escape_html(event.location.as_deref().unwrap_or("TBD"));

    let html_body = format!(
        "<h1>{title}</h1>\n\
         <p><strong>Description:</strong> {description}</p>\n\
         <p><strong>When:</strong> {when}</p>\n\
         <p><strong>Where:</strong> {location}</p>\n"
    );

    Notification {
        sender: None,
        recipients,
        subject: format!("Event Notification: {}", event.title),
        html_body,
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;
    use chrono::{TimeZone, Utc};

    fn event(title: &str) -> Event {
        let mut draft = EventDraft::new(title);
        draft.start = Some(Utc.with_ymd_and_hms(2025, 3, 20, 7, 0, 0).unwrap());
        draft.location = Some("Gymnasium".into());
        Event::from_draft(draft, UserId::new("author"), Utc::now())
    }

    #[test]
    fn test_compose_renders_local_start_time() {
        let notification = compose(&event("Foundation Day"), vec!["a@x.ph".into()], chrono_tz::Asia::Manila);

        assert_eq!(notification.subject, "Event Notification: Foundation Day");
        assert!(notification.html_body.contains("<h1>Foundation Day</h1>"));
        assert!(notification.html_body.contains("3/20/2025, 3:00:00 PM"));
        assert!(notification.html_body.contains("<strong>Description:</strong> N/A"));
        assert!(notification.html_body.contains("<strong>Where:</strong> Gymnasium"));
    }

    #[tokio::test]
    async fn test_dispatch_sends_from_configured_sender() {
        use crate::memory::{MemoryEventStore, MemoryIdentityStore, MemoryProfileStore, Outbox};
        use crate::profile::{Identity, Role};
        use crate::store::EventStore;
        use crate::targeting::TargetingCriteria;

        let staff = UserId::new("staff-1");
        let identities = MemoryIdentityStore::new(vec![Identity {
            id: staff.clone(),
            email: "staff@dmmmsu.edu.ph".into(),
        }]);
        let profiles = MemoryProfileStore::new(vec![UserProfile::new(staff, "staff", Role::Staff)]);

        let mut targeted = event("Staff meeting");
        targeted.targeting = TargetingCriteria::default().with_roles([Role::Staff]);
        let events = MemoryEventStore::default();
        events.insert(targeted.clone()).await.unwrap();

        let outbox = Arc::new(Outbox::default());
        let dispatcher = Dispatcher::new(
            Arc::new(events),
            Arc::new(identities),
            Arc::new(profiles),
            outbox.clone(),
            chrono_tz::Asia::Manila,
        )
        .with_sender(Some("events@dmmmsu.edu.ph".into()));

        let outcome = dispatcher.dispatch(targeted.id).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Sent { count: 1 });

        let sent = outbox.sent().await;
        assert_eq!(sent[0].sender.as_deref(), Some("events@dmmmsu.edu.ph"));
        assert_eq!(sent[0].recipients, vec!["staff@dmmmsu.edu.ph"]);
    }

    #[test]
    fn test_compose_escapes_markup() {
        let mut e = event("<script>alert(1)</script>");
        e.start = None;
        e.location = None;

        let notification = compose(&e, vec![], chrono_tz::UTC);
        assert!(!notification.html_body.contains("<script>"));
        assert!(notification.html_body.contains("&lt;script&gt;"));
        assert!(notification.html_body.contains("<strong>When:</strong> TBD"));
        assert!(notification.html_body.contains("<strong>Where:</strong> TBD"));
    }
}
