//! Audience targeting criteria attached to events.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::profile::{Role, Section, Unit, YearLevel};

/// Who an event is meant for.
///
/// Each set is independent. An empty set means "no restriction" at that level.
/// When `roles` is empty the event is public and the other sets are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingCriteria {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: BTreeSet<Role>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub units: BTreeSet<Unit>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub year_levels: BTreeSet<YearLevel>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sections: BTreeSet<Section>,
}

/// Stored rows use `null` for "no restriction"; treat it like an empty set.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<BTreeSet<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Ord,
{
    Ok(Option::<BTreeSet<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TargetingCriteria {
    /// Criteria that match everyone.
    pub fn public() -> Self {
        Self::default()
    }

    pub fn is_public(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = Unit>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_year_levels(mut self, years: impl IntoIterator<Item = YearLevel>) -> Self {
        self.year_levels.extend(years);
        self
    }

    pub fn with_sections(mut self, sections: impl IntoIterator<Item = Section>) -> Self {
        self.sections.extend(sections);
        self
    }

    pub fn targets_students(&self) -> bool {
        self.roles.contains(&Role::Student)
    }

    pub fn targets_affiliated(&self) -> bool {
        self.roles.iter().any(|role| role.is_affiliated())
    }

    /// Drop the dimensions that can never apply given the targeted roles.
    ///
    /// Units only filter affiliated roles; year levels and sections only filter
    /// students. A public event carries no other restriction at all.
    pub fn normalized(mut self) -> Self {
        if self.is_public() {
            return Self::public();
        }
        if !self.targets_affiliated() {
            self.units.clear();
        }
        if !self.targets_students() {
            self.year_levels.clear();
            self.sections.clear();
        }
        self
    }

    /// Short human-readable summary, e.g. `student · CCS · year 1,2`.
    pub fn describe(&self) -> String {
        if self.is_public() {
            return "everyone".to_string();
        }

        let join = |items: Vec<String>| items.join(",");

        let mut parts = vec![join(self.roles.iter().map(|r| r.to_string()).collect())];
        if !self.units.is_empty() {
            parts.push(join(self.units.iter().map(|u| u.to_string()).collect()));
        }
        if !self.year_levels.is_empty() {
            let years = join(self.year_levels.iter().map(|y| y.to_string()).collect());
            parts.push(format!("year {years}"));
        }
        if !self.sections.is_empty() {
            let sections = join(self.sections.iter().map(|s| s.to_string()).collect());
            parts.push(format!("section {sections}"));
        }
        parts.join(" · ")
    }
}
