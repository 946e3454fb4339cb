//! Deriving a user's role from their email address.

use serde::{Deserialize, Serialize};

use crate::profile::Role;

static DEFAULT_STUDENT_SUFFIX: &str = "@student.dmmmsu.edu.ph";
static DEFAULT_EMPLOYEE_SUFFIX: &str = "@dmmmsu.edu.ph";

fn default_student_suffix() -> String {
    DEFAULT_STUDENT_SUFFIX.to_string()
}

fn default_employee_suffix() -> String {
    DEFAULT_EMPLOYEE_SUFFIX.to_string()
}

/// Email suffixes that identify institutional accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default = "default_student_suffix")]
    pub student_suffix: String,
    #[serde(default = "default_employee_suffix")]
    pub employee_suffix: String,
}

impl Default for DomainConfig {
    fn default() -> Self {
        DomainConfig {
            student_suffix: default_student_suffix(),
            employee_suffix: default_employee_suffix(),
        }
    }
}

/// What an email address says about its owner's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedRole {
    /// Student account; the role is fixed.
    Student,
    /// Institutional employee; picks faculty or staff themselves.
    Employee,
    /// Anyone else; the role is fixed and there is no unit.
    Guest,
}

impl DerivedRole {
    /// The role this account must have, if it has no choice.
    pub fn fixed_role(self) -> Option<Role> {
        match self {
            DerivedRole::Student => Some(Role::Student),
            DerivedRole::Employee => None,
            DerivedRole::Guest => Some(Role::Guest),
        }
    }

    /// Roles this account may hold.
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            DerivedRole::Student => &[Role::Student],
            DerivedRole::Employee => &[Role::Faculty, Role::Staff],
            DerivedRole::Guest => &[Role::Guest],
        }
    }
}

impl DomainConfig {
    pub fn derive(&self, email: &str) -> DerivedRole {
        let email = email.trim().to_ascii_lowercase();

        if ends_with_suffix(&email, &self.student_suffix) {
            DerivedRole::Student
        } else if ends_with_suffix(&email, &self.employee_suffix) {
            DerivedRole::Employee
        } else {
            DerivedRole::Guest
        }
    }
}

fn ends_with_suffix(email: &str, suffix: &str) -> bool {
    let suffix = suffix.trim();
    !suffix.is_empty() && email.ends_with(&suffix.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_student() {
        let domains = DomainConfig::default();
        assert_eq!(domains.derive("juan@student.dmmmsu.edu.ph"), DerivedRole::Student);
        assert_eq!(domains.derive("Juan@Student.DMMMSU.edu.ph "), DerivedRole::Student);
    }

    #[test]
    fn test_derive_employee() {
        let domains = DomainConfig::default();
        assert_eq!(domains.derive("maria@dmmmsu.edu.ph"), DerivedRole::Employee);
    }

    #[test]
    fn test_derive_guest() {
        let domains = DomainConfig::default();
        assert_eq!(domains.derive("someone@gmail.com"), DerivedRole::Guest);
        assert_eq!(domains.derive("someone@notdmmmsu.edu.ph"), DerivedRole::Guest);
    }

    #[test]
    fn test_custom_suffixes() {
        let domains = DomainConfig {
            student_suffix: "@learners.example.edu".into(),
            employee_suffix: "@example.edu".into(),
        };
        assert_eq!(domains.derive("a@learners.example.edu"), DerivedRole::Student);
        assert_eq!(domains.derive("b@example.edu"), DerivedRole::Employee);
        assert_eq!(domains.derive("c@student.dmmmsu.edu.ph"), DerivedRole::Guest);
    }

    #[test]
    fn test_allowed_roles() {
        assert_eq!(DerivedRole::Student.fixed_role(), Some(Role::Student));
        assert_eq!(DerivedRole::Employee.fixed_role(), None);
        assert_eq!(DerivedRole::Employee.allowed_roles(), &[Role::Faculty, Role::Staff]);
    }
}
