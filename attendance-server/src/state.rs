use std::sync::Arc;

use anyhow::{Context, Result};
use chrono_tz::Tz;

use attendance_core::clock::SystemClock;
use attendance_core::config::PortalConfig;
use attendance_core::memory::{Outbox, Seed};
use attendance_core::notify::Dispatcher;
use attendance_core::role::DomainConfig;
use attendance_core::service::{AccountService, EventService};
use attendance_core::store::{
    EventStore, IdentityStore, NotificationTransport, ProfileStore, TrustedClock,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub identities: Arc<dyn IdentityStore>,
    pub accounts: AccountService,
    pub events: EventService,
    pub dispatcher: Arc<Dispatcher>,
    pub clock: Arc<dyn TrustedClock>,
}

/// The collaborators the server is built from.
pub struct Stores {
    pub identities: Arc<dyn IdentityStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub events: Arc<dyn EventStore>,
    pub transport: Arc<dyn NotificationTransport>,
}

impl AppState {
    /// In-memory stores, filled from the seed file when one is configured.
    pub fn from_config(config: &PortalConfig) -> Result<Self> {
        let seed = match &config.server.seed_file {
            Some(path) => Seed::load(path)
                .with_context(|| format!("Failed to load seed file {}", path.display()))?,
            None => Seed::default(),
        };
        let (identities, profiles, events) = seed.into_stores()?;

        let stores = Stores {
            identities: Arc::new(identities),
            profiles: Arc::new(profiles),
            events: Arc::new(events),
            transport: Arc::new(Outbox::default()),
        };

        Ok(Self::new(
            stores,
            config.domain.clone(),
            config.notify.tz()?,
            config.notify.sender.clone(),
        ))
    }

    pub fn new(stores: Stores, domains: DomainConfig, timezone: Tz, sender: Option<String>) -> Self {
        let dispatcher = Dispatcher::new(
            stores.events.clone(),
            stores.identities.clone(),
            stores.profiles.clone(),
            stores.transport,
            timezone,
        )
        .with_sender(sender);

        AppState {
            accounts: AccountService::new(stores.profiles.clone(), domains),
            events: EventService::new(stores.events, stores.profiles),
            identities: stores.identities,
            dispatcher: Arc::new(dispatcher),
            clock: Arc::new(SystemClock),
        }
    }
}
