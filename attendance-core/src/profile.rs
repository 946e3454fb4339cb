//! User identities and role-specific profiles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PortalError;

/// Opaque user identifier issued by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the identity store knows about a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Staff,
    Guest,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Student, Role::Faculty, Role::Staff, Role::Guest];

    /// Student, faculty and staff belong to a unit and are subject to unit filtering.
    pub fn is_affiliated(self) -> bool {
        matches!(self, Role::Student | Role::Faculty | Role::Staff)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Staff => "staff",
            Role::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PortalError::Validation(format!("Unknown role '{s}'")))
    }
}

/// Institutional unit (college or office code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    Ca,
    Cas,
    Cchams,
    Ccs,
    Ce,
    Cf,
    Cgs,
    Cm,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Ca,
        Unit::Cas,
        Unit::Cchams,
        Unit::Ccs,
        Unit::Ce,
        Unit::Cf,
        Unit::Cgs,
        Unit::Cm,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Unit::Ca => "CA",
            Unit::Cas => "CAS",
            Unit::Cchams => "CCHAMS",
            Unit::Ccs => "CCS",
            Unit::Ce => "CE",
            Unit::Cf => "CF",
            Unit::Cgs => "CGS",
            Unit::Cm => "CM",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Unit {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .into_iter()
            .find(|unit| unit.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PortalError::Validation(format!("Unknown unit '{s}'")))
    }
}

/// Student year level, always within 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct YearLevel(u8);

impl YearLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(level: u8) -> Result<Self, PortalError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(YearLevel(level))
        } else {
            Err(PortalError::Validation(format!(
                "Year level must be between {} and {}, got {level}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for YearLevel {
    type Error = PortalError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        YearLevel::new(level)
    }
}

impl From<YearLevel> for u8 {
    fn from(level: YearLevel) -> Self {
        level.0
    }
}

impl fmt::Display for YearLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for YearLevel {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = s
            .trim()
            .parse::<u8>()
            .map_err(|_| PortalError::Validation(format!("Invalid year level '{s}'")))?;
        YearLevel::new(level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Irregular,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Irregular,
        Section::A,
        Section::B,
        Section::C,
        Section::D,
        Section::E,
        Section::F,
        Section::G,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Irregular => "Irregular",
            Section::A => "A",
            Section::B => "B",
            Section::C => "C",
            Section::D => "D",
            Section::E => "E",
            Section::F => "F",
            Section::G => "G",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PortalError::Validation(format!("Unknown section '{s}'")))
    }
}

/// A user's portal profile.
///
/// Which of `unit`, `year`, `section` and `position` mean anything depends on
/// `role`. The audience resolver ignores the rest even when they are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub year: Option<YearLevel>,
    #[serde(default)]
    pub section: Option<Section>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub can_create_events: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub photo_consent: bool,
    #[serde(default)]
    pub social_media_consent: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Minimal profile with only the fields the resolver looks at.
    pub fn new(id: UserId, username: impl Into<String>, role: Role) -> Self {
        UserProfile {
            id,
            username: username.into(),
            first_name: None,
            last_name: None,
            role,
            unit: None,
            year: None,
            section: None,
            position: None,
            can_create_events: false,
            is_admin: false,
            photo_consent: false,
            social_media_consent: false,
            updated_at: None,
        }
    }

    /// Clear the fields that don't belong to this profile's role.
    pub fn normalize(&mut self) {
        if !self.role.is_affiliated() {
            self.unit = None;
        }
        if self.role != Role::Student {
            self.year = None;
            self.section = None;
        }
        if self.role != Role::Faculty {
            self.position = None;
        }
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self.username.clone(),
        }
    }
}
