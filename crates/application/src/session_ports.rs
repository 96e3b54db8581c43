use async_trait::async_trait;
use serde::Deserialize;
use smartpro_core::AppResult;
use smartpro_domain::{PermissionState, ProjectId, RoleName, RoleSet};

/// Payload returned by `get_user_permissions`.
///
/// Every field is optional on the wire; missing values fall back to the
/// restrictive defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserPermissionsPayload {
    /// Logical success flag reported by the backend.
    pub success: bool,
    /// Read-only visibility into all records.
    pub has_full_access: Option<bool>,
    /// Timesheet approver for managed projects.
    pub is_project_manager: Option<bool>,
    /// Projects managed by the user.
    pub managed_projects: Option<Vec<String>>,
    /// Optional message accompanying a logical failure.
    pub message: Option<String>,
}

impl UserPermissionsPayload {
    /// Builds the permission triple, defaulting missing fields.
    #[must_use]
    pub fn into_permission_state(self) -> PermissionState {
        PermissionState {
            has_full_access: self.has_full_access.unwrap_or(false),
            is_project_manager: self.is_project_manager.unwrap_or(false),
            managed_projects: self
                .managed_projects
                .unwrap_or_default()
                .into_iter()
                .map(ProjectId::new)
                .collect(),
        }
    }
}

/// Payload returned by `get_user_roles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserRolesPayload {
    /// Role names held by the user.
    pub roles: Option<Vec<String>>,
}

impl UserRolesPayload {
    /// Builds the role set, empty when the field is absent.
    #[must_use]
    pub fn into_role_set(self) -> RoleSet {
        self.roles
            .unwrap_or_default()
            .into_iter()
            .map(RoleName::new)
            .collect()
    }
}

/// Payload returned by `get_logged_user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggedUserPayload {
    /// Username, or the `"Guest"` sentinel.
    pub message: Option<String>,
}

/// Payload returned by a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    /// Backend status message, usually `"Logged In"`.
    pub message: Option<String>,
    /// Display name of the user that logged in.
    pub full_name: Option<String>,
    /// Landing page suggested by the backend.
    pub home_page: Option<String>,
}

/// Remote procedure calls that describe the current session.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Fetches access-level flags and managed projects.
    async fn get_user_permissions(&self) -> AppResult<UserPermissionsPayload>;

    /// Fetches the role names of the current user.
    async fn get_user_roles(&self) -> AppResult<UserRolesPayload>;

    /// Resolves the username behind the current session.
    async fn get_logged_user(&self) -> AppResult<LoggedUserPayload>;
}

/// Remote calls that open and close a session.
#[async_trait]
pub trait AuthenticationApi: Send + Sync {
    /// Exchanges credentials for a session.
    async fn login(&self, username: &str, password: &str) -> AppResult<LoginPayload>;

    /// Ends the current session.
    async fn logout(&self) -> AppResult<()>;
}

/// Wall-clock source for cache expiry.
pub trait Clock: Send + Sync {
    /// Returns the current time in epoch milliseconds.
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
