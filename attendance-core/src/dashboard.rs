//! The per-user event list with live status.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audience;
use crate::event::Event;
use crate::profile::{UserId, UserProfile};
use crate::status::{EventState, StatusReport, compute_status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Upcoming, ongoing and undated events.
    Upcoming,
    Finished,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardEntry {
    pub event: Event,
    pub status: StatusReport,
    /// The viewer created this event and may edit it.
    pub is_mine: bool,
}

impl DashboardEntry {
    pub fn tab(&self) -> Tab {
        if self.status.state == EventState::Finished {
            Tab::Finished
        } else {
            Tab::Upcoming
        }
    }
}

/// Events a user may see, tagged with their status at the last refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    entries: Vec<DashboardEntry>,
    refreshed_at: DateTime<Utc>,
}

impl Dashboard {
    /// Filter `events` down to what `profile` may see and tag each one at `now`.
    ///
    /// Event order is kept as given.
    pub fn build(user: &UserId, profile: &UserProfile, events: Vec<Event>, now: DateTime<Utc>) -> Self {
        let entries = audience::visible_events(user, profile, &events)
            .into_iter()
            .map(|event| DashboardEntry {
                status: compute_status(event.start, event.end, now),
                is_mine: event.is_created_by(user),
                event: event.clone(),
            })
            .collect();

        Dashboard {
            entries,
            refreshed_at: now,
        }
    }

    /// Recompute every status at `now`. Cheap enough to run on each tick.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        for entry in &mut self.entries {
            entry.status = compute_status(entry.event.start, entry.event.end, now);
        }
        self.refreshed_at = now;
    }

    pub fn tab(&self, tab: Tab) -> impl Iterator<Item = &DashboardEntry> {
        self.entries.iter().filter(move |entry| entry.tab() == tab)
    }

    pub fn entries(&self) -> &[DashboardEntry] {
        &self.entries
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;
    use crate::profile::{Role, Unit};
    use crate::targeting::TargetingCriteria;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 12, 2, 0, 0).unwrap()
    }

    fn event(title: &str, start: i64, end: i64, targeting: TargetingCriteria, author: &str) -> Event {
        let mut draft = EventDraft::new(title);
        draft.start = Some(now() + Duration::minutes(start));
        draft.end = Some(now() + Duration::minutes(end));
        draft.targeting = targeting;
        Event::from_draft(draft, UserId::new(author), now() - Duration::days(1))
    }

    fn titles<'a>(entries: impl Iterator<Item = &'a DashboardEntry>) -> Vec<&'a str> {
        entries.map(|e| e.event.title.as_str()).collect()
    }

    #[test]
    fn test_build_filters_and_splits_tabs() {
        let viewer = UserId::new("faculty-1");
        let mut profile = UserProfile::new(viewer.clone(), "prof", Role::Faculty);
        profile.unit = Some(Unit::Ccs);

        let students_only = TargetingCriteria::default().with_roles([Role::Student]);
        let ccs_faculty = TargetingCriteria::default()
            .with_roles([Role::Faculty])
            .with_units([Unit::Ccs]);

        let events = vec![
            event("Later", 60, 120, TargetingCriteria::public(), "admin"),
            event("Running", -10, 5, ccs_faculty, "admin"),
            event("Student thing", 30, 90, students_only.clone(), "admin"),
            event("My student thing", 30, 90, students_only, "faculty-1"),
            event("Yesterday", -1440, -1380, TargetingCriteria::public(), "admin"),
        ];

        let dashboard = Dashboard::build(&viewer, &profile, events, now());

        assert_eq!(
            titles(dashboard.tab(Tab::Upcoming)),
            vec!["Later", "Running", "My student thing"]
        );
        assert_eq!(titles(dashboard.tab(Tab::Finished)), vec!["Yesterday"]);

        let running = &dashboard.entries()[1];
        assert_eq!(running.status.state, EventState::Ongoing);
        assert_eq!(running.status.remaining.unwrap().to_string(), "00:05:00");
        assert!(dashboard.entries()[2].is_mine);
    }

    #[test]
    fn test_refresh_moves_finished_events() {
        let viewer = UserId::new("guest-1");
        let profile = UserProfile::new(viewer.clone(), "guest", Role::Guest);
        let events = vec![event("Short talk", -10, 5, TargetingCriteria::public(), "admin")];

        let mut dashboard = Dashboard::build(&viewer, &profile, events, now());
        assert_eq!(dashboard.tab(Tab::Finished).count(), 0);

        dashboard.refresh(now() + Duration::minutes(5));
        assert_eq!(dashboard.tab(Tab::Upcoming).count(), 0);
        assert_eq!(titles(dashboard.tab(Tab::Finished)), vec!["Short talk"]);
        assert_eq!(dashboard.refreshed_at(), now() + Duration::minutes(5));
    }

    #[test]
    fn test_undated_events_stay_upcoming() {
        let viewer = UserId::new("guest-1");
        let profile = UserProfile::new(viewer.clone(), "guest", Role::Guest);
        let undated = Event::from_draft(EventDraft::new("TBA"), UserId::new("admin"), now());

        let dashboard = Dashboard::build(&viewer, &profile, vec![undated], now());
        let entry = &dashboard.entries()[0];
        assert_eq!(entry.status.state, EventState::InfoMissing);
        assert_eq!(entry.tab(), Tab::Upcoming);
    }
}
