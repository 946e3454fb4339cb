//! Core types for the attendance portal.
//!
//! This crate is shared by the CLI and the server:
//! - `audience` decides who may see (and who is notified about) an event
//! - `status` derives an event's lifecycle state from the current time
//! - `clock` corrects local time against a trusted source and drives the ticker
//! - `store` describes the external collaborators, `memory` implements them in memory

pub mod audience;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod memory;
pub mod notify;
pub mod profile;
pub mod role;
pub mod service;
pub mod status;
pub mod store;
pub mod targeting;

pub use error::{PortalError, PortalResult};
pub use event::{Event, EventDraft, EventId};
pub use profile::{Identity, Role, Section, Unit, UserId, UserProfile, YearLevel};
pub use status::{EventState, Remaining, StatusReport, compute_status};
pub use targeting::TargetingCriteria;
