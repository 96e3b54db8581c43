//! Backend role names and the role-derived predicates used by views.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Role that marks an employee record holder.
pub const EMPLOYEE_ROLE: &str = "Employee";

/// Roles that unlock team-lead views (approvals, assignments).
pub const TEAM_LEAD_ROLES: &[&str] = &[
    "Projects Manager",
    "Project Manager",
    "HR Manager",
    "HR-Manager",
    "System Manager",
];

/// Backend role name, compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a role name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for RoleName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Roles held by the current user.
///
/// Stored in backend order but only ever queried by membership, so
/// duplicates carry no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(Vec<RoleName>);

impl RoleSet {
    /// Creates a role set from backend role names.
    #[must_use]
    pub fn new(roles: Vec<RoleName>) -> Self {
        Self(roles)
    }

    /// Returns whether the exact role name is held.
    #[must_use]
    pub fn has_role(&self, name: &str) -> bool {
        self.0.iter().any(|role| role.as_str() == name)
    }

    /// Returns whether any team-lead role is held.
    #[must_use]
    pub fn is_team_lead(&self) -> bool {
        TEAM_LEAD_ROLES.iter().any(|role| self.has_role(role))
    }

    /// Returns whether the employee role is held.
    #[must_use]
    pub fn is_employee(&self) -> bool {
        self.has_role(EMPLOYEE_ROLE)
    }

    /// Returns whether no roles are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of role entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the role names in backend order.
    #[must_use]
    pub fn as_slice(&self) -> &[RoleName] {
        self.0.as_slice()
    }
}

impl FromIterator<RoleName> for RoleSet {
    fn from_iter<T: IntoIterator<Item = RoleName>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
