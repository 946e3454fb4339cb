//! End-to-end flows across the services, the dashboard and the dispatcher.

use std::sync::Arc;

use attendance_core::dashboard::{Dashboard, Tab};
use attendance_core::memory::{MemoryEventStore, MemoryIdentityStore, MemoryProfileStore, Outbox};
use attendance_core::notify::{DispatchOutcome, Dispatcher};
use attendance_core::role::DomainConfig;
use attendance_core::service::{AccountService, EventService, ProfileForm};
use attendance_core::store::ProfileStore;
use attendance_core::{
    EventDraft, EventState, Identity, PortalError, Role, Section, TargetingCriteria, Unit, UserId,
    YearLevel, compute_status,
};
use chrono::{Duration, Utc};

struct Portal {
    accounts: AccountService,
    events: EventService,
    dispatcher: Dispatcher,
    outbox: Arc<Outbox>,
    profiles: Arc<MemoryProfileStore>,
}

fn identity(id: &str, email: &str) -> Identity {
    Identity {
        id: UserId::new(id),
        email: email.into(),
    }
}

fn year(level: u8) -> YearLevel {
    YearLevel::new(level).unwrap()
}

/// Four users with profiles, one of them allowed to create events.
async fn setup() -> Portal {
    let users = vec![
        identity("s1", "first@student.dmmmsu.edu.ph"),
        identity("s3", "third@student.dmmmsu.edu.ph"),
        identity("f1", "prof@dmmmsu.edu.ph"),
        identity("g1", "visitor@gmail.com"),
        identity("nobody", "no-profile@gmail.com"),
    ];

    let identities = Arc::new(MemoryIdentityStore::new(users.clone()));
    let profiles = Arc::new(MemoryProfileStore::default());
    let events = Arc::new(MemoryEventStore::default());
    let outbox = Arc::new(Outbox::default());

    let accounts = AccountService::new(profiles.clone(), DomainConfig::default());

    let student = |username: &str, level: u8| ProfileForm {
        username: username.into(),
        unit: Some(Unit::Ccs),
        year: Some(year(level)),
        section: Some(Section::A),
        ..ProfileForm::default()
    };

    accounts.save(&users[0], student("first", 1)).await.unwrap();
    accounts.save(&users[1], student("third", 3)).await.unwrap();
    accounts
        .save(
            &users[2],
            ProfileForm {
                username: "prof".into(),
                role: Some(Role::Faculty),
                unit: Some(Unit::Ccs),
                ..ProfileForm::default()
            },
        )
        .await
        .unwrap();
    accounts
        .save(
            &users[3],
            ProfileForm {
                username: "visitor".into(),
                ..ProfileForm::default()
            },
        )
        .await
        .unwrap();

    let mut prof = profiles.get(&UserId::new("f1")).await.unwrap();
    prof.can_create_events = true;
    profiles.upsert(prof).await.unwrap();

    Portal {
        accounts,
        events: EventService::new(events.clone(), profiles.clone()),
        dispatcher: Dispatcher::new(
            events,
            identities,
            profiles.clone(),
            outbox.clone(),
            chrono_tz::Asia::Manila,
        ),
        outbox,
        profiles,
    }
}

#[tokio::test]
async fn test_targeted_event_reaches_matching_students_only() {
    let portal = setup().await;
    let author = UserId::new("f1");

    let mut draft = EventDraft::new("CCS freshmen assembly");
    draft.start = Some(Utc::now() + Duration::days(1));
    draft.end = Some(Utc::now() + Duration::days(1) + Duration::hours(2));
    draft.targeting = TargetingCriteria::default()
        .with_roles([Role::Student])
        .with_units([Unit::Ccs])
        .with_year_levels([year(1), year(2)]);

    let event = portal.events.create(&author, draft).await.unwrap();
    let outcome = portal.dispatcher.dispatch(event.id).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Sent { count: 1 });
    let sent = portal.outbox.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients, vec!["first@student.dmmmsu.edu.ph"]);
    assert_eq!(sent[0].subject, "Event Notification: CCS freshmen assembly");

    // The dashboard agrees with the dispatcher for every user.
    let all_events = portal.events.list().await.unwrap();
    for (id, expected) in [("s1", true), ("s3", false), ("g1", false)] {
        let user = UserId::new(id);
        let profile = portal.profiles.get(&user).await.unwrap();
        let dashboard = Dashboard::build(&user, &profile, all_events.clone(), Utc::now());
        assert_eq!(!dashboard.is_empty(), expected, "user {id}");
    }

    // The author sees their own event even though faculty aren't targeted.
    let prof = portal.profiles.get(&author).await.unwrap();
    let dashboard = Dashboard::build(&author, &prof, all_events, Utc::now());
    assert_eq!(dashboard.tab(Tab::Upcoming).count(), 1);
}

#[tokio::test]
async fn test_public_event_sends_nothing() {
    let portal = setup().await;

    let event = portal
        .events
        .create(&UserId::new("f1"), EventDraft::new("Open campus day"))
        .await
        .unwrap();

    let outcome = portal.dispatcher.dispatch(event.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::PublicEvent);
    assert!(portal.outbox.sent().await.is_empty());
}

#[tokio::test]
async fn test_event_without_audience() {
    let portal = setup().await;

    let mut draft = EventDraft::new("Staff planning");
    draft.targeting = TargetingCriteria::default().with_roles([Role::Staff]);
    let event = portal.events.create(&UserId::new("f1"), draft).await.unwrap();

    let outcome = portal.dispatcher.dispatch(event.id).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::NoRecipients);
    assert_eq!(outcome.message(), "No target users found for this event.");
}

#[tokio::test]
async fn test_guests_notified_regardless_of_unit_filters() {
    let portal = setup().await;

    let mut draft = EventDraft::new("Community outreach");
    draft.targeting = TargetingCriteria::default()
        .with_roles([Role::Guest, Role::Faculty])
        .with_units([Unit::Cm]);
    let event = portal.events.create(&UserId::new("f1"), draft).await.unwrap();

    portal.dispatcher.dispatch(event.id).await.unwrap();
    let sent = portal.outbox.sent().await;
    assert_eq!(sent[0].recipients, vec!["visitor@gmail.com"]);
}

#[tokio::test]
async fn test_dispatch_unknown_event() {
    let portal = setup().await;
    let missing = attendance_core::EventId::generate();

    let result = portal.dispatcher.dispatch(missing).await;
    assert!(matches!(result, Err(PortalError::EventNotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_username_conflict_through_account_service() {
    let portal = setup().await;

    let result = portal
        .accounts
        .save(
            &identity("nobody", "no-profile@gmail.com"),
            ProfileForm {
                username: "prof".into(),
                ..ProfileForm::default()
            },
        )
        .await;

    assert!(matches!(result, Err(PortalError::UsernameTaken(_))));
}

#[test]
fn test_status_scenarios() {
    let now = Utc::now();

    let ongoing = compute_status(
        Some(now - Duration::minutes(10)),
        Some(now + Duration::minutes(5)),
        now,
    );
    assert_eq!(ongoing.state, EventState::Ongoing);
    assert_eq!(ongoing.remaining.unwrap().to_string(), "00:05:00");

    let finished = compute_status(Some(now - Duration::hours(1)), Some(now - Duration::seconds(1)), now);
    assert_eq!(finished.state, EventState::Finished);
    assert_eq!(finished.remaining, None);
}
