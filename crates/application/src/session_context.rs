//! Session-scoped bundle of the permission, role and identity caches.

use std::sync::Arc;

use smartpro_core::{AppResult, NonEmptyString};
use smartpro_domain::RouteTable;
use tracing::{info, warn};

use crate::{
    AuthGate, AuthenticationApi, Clock, GateConfig, LoginPayload, PermissionStore, RoleStore,
    Router, SessionApi,
};

/// Owns every piece of session state and resets it on login and logout.
pub struct SessionContext {
    permissions: Arc<PermissionStore>,
    roles: Arc<RoleStore>,
    gate: Arc<AuthGate>,
    auth_api: Arc<dyn AuthenticationApi>,
}

impl SessionContext {
    /// Creates fresh stores and a gate sharing one backend connection.
    #[must_use]
    pub fn new(
        session_api: Arc<dyn SessionApi>,
        auth_api: Arc<dyn AuthenticationApi>,
        clock: Arc<dyn Clock>,
        gate_config: GateConfig,
    ) -> Self {
        Self {
            permissions: Arc::new(PermissionStore::new(session_api.clone())),
            roles: Arc::new(RoleStore::new(session_api.clone())),
            gate: Arc::new(AuthGate::new(session_api, clock, gate_config)),
            auth_api,
        }
    }

    /// Returns the permission store.
    #[must_use]
    pub fn permissions(&self) -> &Arc<PermissionStore> {
        &self.permissions
    }

    /// Returns the role store.
    #[must_use]
    pub fn roles(&self) -> &Arc<RoleStore> {
        &self.roles
    }

    /// Returns the navigation gate.
    #[must_use]
    pub fn gate(&self) -> &Arc<AuthGate> {
        &self.gate
    }

    /// Builds a router guarded by this session's gate.
    #[must_use]
    pub fn router(&self, table: RouteTable) -> Router {
        Router::new(table, self.gate.clone())
    }

    /// Logs in and drops any state cached for the previous user.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginPayload> {
        let username = NonEmptyString::new(username)?;
        let password = NonEmptyString::new(password)?;

        let payload = self
            .auth_api
            .login(username.as_str(), password.as_str())
            .await?;
        self.clear_session_state().await;
        info!(user = %username.as_str(), "logged in");

        Ok(payload)
    }

    /// Logs out and resets all session state.
    ///
    /// Local state is reset even when the remote logout fails; that failure
    /// is returned afterwards.
    pub async fn logout(&self) -> AppResult<()> {
        let result = self.auth_api.logout().await;
        self.clear_session_state().await;

        match result {
            Ok(()) => {
                info!("logged out");
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "remote logout failed, local session state cleared");
                Err(error)
            }
        }
    }

    /// Clears both stores and the identity cache.
    pub async fn clear_session_state(&self) {
        self.permissions.clear().await;
        self.roles.clear().await;
        self.gate.clear_auth_cache().await;
    }
}
