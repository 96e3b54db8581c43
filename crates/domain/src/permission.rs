//! Access-level flags resolved for the current user.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifier of a Smart Project record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a project identifier from the backend record name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying record name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Display for ProjectId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Permission triple for the current user.
///
/// Always replaced as a whole; `Default` is the maximally restrictive state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionState {
    /// Read-only visibility into every record.
    pub has_full_access: bool,
    /// May approve timesheets for the projects in `managed_projects`.
    pub is_project_manager: bool,
    /// Projects this user manages. May be empty for a manager.
    pub managed_projects: Vec<ProjectId>,
}

impl PermissionState {
    /// Returns whether the user may approve timesheets for `project`.
    ///
    /// Full access overrides project membership entirely.
    #[must_use]
    pub fn can_approve(&self, project: &ProjectId) -> bool {
        if self.has_full_access {
            return true;
        }

        self.is_project_manager && self.managed_projects.contains(project)
    }

    /// Returns whether an item should be presented read-only.
    ///
    /// Depends only on `has_full_access`; the owner/assignee is accepted but
    /// not compared yet.
    #[must_use]
    pub fn is_read_only(&self, _owner_or_assignee: &str) -> bool {
        self.has_full_access
    }
}
