//! Audience resolution: who may see an event, and who gets notified about it.
//!
//! This is the only implementation of the targeting rules. The dashboard uses
//! it to filter the event list and the notification dispatcher uses it to pick
//! recipients, so both always agree.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::event::Event;
use crate::profile::{Identity, Role, UserId, UserProfile};
use crate::targeting::TargetingCriteria;

/// Decide whether `profile` belongs to the audience described by `criteria`.
///
/// Checks run in a fixed order and stop at the first decision:
///
/// 1. creators always see their own events
/// 2. no target roles means the event is public
/// 3. the user's role must be targeted
/// 4. affiliated roles must be in a targeted unit, if any are given
/// 5. students must be in a targeted year level, if any are given
/// 6. students must be in a targeted section, if any are given
///
/// Year level and section never reject a non-student, and guests are never
/// filtered by unit.
pub fn is_visible(profile: &UserProfile, criteria: &TargetingCriteria, is_creator: bool) -> bool {
    if is_creator {
        return true;
    }

    if criteria.is_public() {
        return true;
    }

    if !criteria.roles.contains(&profile.role) {
        return false;
    }

    if profile.role.is_affiliated() && !matches_any(&criteria.units, profile.unit.as_ref()) {
        return false;
    }

    if profile.role == Role::Student {
        if !matches_any(&criteria.year_levels, profile.year.as_ref()) {
            return false;
        }
        if !matches_any(&criteria.sections, profile.section.as_ref()) {
            return false;
        }
    }

    true
}

/// An empty target set matches anything; otherwise the value must be present and listed.
fn matches_any<T: Ord>(targets: &BTreeSet<T>, value: Option<&T>) -> bool {
    targets.is_empty() || value.is_some_and(|v| targets.contains(v))
}

/// Events from `events` that `user` may see, in their original order.
pub fn visible_events<'a>(
    user: &UserId,
    profile: &UserProfile,
    events: impl IntoIterator<Item = &'a Event>,
) -> Vec<&'a Event> {
    events
        .into_iter()
        .filter(|event| is_visible(profile, &event.targeting, event.is_created_by(user)))
        .collect()
}

/// Email addresses of everyone in `population` who should be notified.
///
/// Public events notify nobody. Users without a profile or without an email
/// are skipped, and each address is returned once, in population order.
pub fn recipients<'a>(
    criteria: &TargetingCriteria,
    population: impl IntoIterator<Item = (&'a Identity, Option<&'a UserProfile>)>,
) -> Vec<String> {
    if criteria.is_public() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut emails = Vec::new();

    for (identity, profile) in population {
        let Some(profile) = profile else {
            debug!(user = %identity.id, "skipping user without a profile");
            continue;
        };

        let email = identity.email.trim();
        if email.is_empty() {
            continue;
        }

        let matched = is_visible(profile, criteria, false);
        debug!(user = %identity.id, role = %profile.role, matched, "checked notification audience");

        if matched && seen.insert(email.to_ascii_lowercase()) {
            emails.push(email.to_string());
        }
    }

    emails
}
