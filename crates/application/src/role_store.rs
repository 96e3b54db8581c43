//! Fetch-once cache of the current user's role names.

use std::sync::Arc;

use smartpro_core::AppError;
use smartpro_domain::RoleSet;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{FetchStatus, SessionApi};

#[derive(Debug, Default)]
struct RoleSnapshot {
    roles: RoleSet,
    status: FetchStatus,
}

impl RoleSnapshot {
    // An empty role list never counts as cached, so it is fetched again.
    fn is_cached(&self) -> bool {
        self.status.fetched && !self.roles.is_empty()
    }
}

/// Session-scoped role store.
pub struct RoleStore {
    api: Arc<dyn SessionApi>,
    snapshot: RwLock<RoleSnapshot>,
    in_flight: Mutex<()>,
}

impl RoleStore {
    /// Creates a store with no roles.
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        Self {
            api,
            snapshot: RwLock::new(RoleSnapshot::default()),
            in_flight: Mutex::new(()),
        }
    }

    /// Fetches roles unless a non-empty role list is already cached.
    ///
    /// Failures are recorded in the status and leave the roles unchanged.
    pub async fn fetch_roles(&self) {
        if self.snapshot.read().await.is_cached() {
            debug!("serving cached user roles");
            return;
        }

        let _in_flight = self.in_flight.lock().await;
        if self.snapshot.read().await.is_cached() {
            return;
        }

        {
            let mut snapshot = self.snapshot.write().await;
            snapshot.status.loading = true;
            snapshot.status.error = None;
        }

        let result = self.api.get_user_roles().await;

        let mut snapshot = self.snapshot.write().await;
        match result {
            Ok(payload) => {
                snapshot.roles = payload.into_role_set();
                info!(roles = snapshot.roles.len(), "user roles fetched");
            }
            Err(error) => {
                warn!(error = %error, "failed to fetch user roles");
                snapshot.status.error = Some(error);
            }
        }
        snapshot.status.fetched = true;
        snapshot.status.loading = false;
    }

    /// Drops all roles and re-enables fetching.
    ///
    /// Waits for an in-flight fetch so its result cannot land after the clear.
    pub async fn clear(&self) {
        let _in_flight = self.in_flight.lock().await;
        let mut snapshot = self.snapshot.write().await;
        snapshot.roles = RoleSet::default();
        snapshot.status.fetched = false;
    }

    /// Returns the current roles without fetching.
    pub async fn roles(&self) -> RoleSet {
        self.snapshot.read().await.roles.clone()
    }

    /// Returns whether the user holds any team-lead role.
    pub async fn is_team_lead(&self) -> bool {
        self.snapshot.read().await.roles.is_team_lead()
    }

    /// Returns whether the user holds the employee role.
    pub async fn is_employee(&self) -> bool {
        self.snapshot.read().await.roles.is_employee()
    }

    /// Returns whether the user holds exactly this role.
    pub async fn has_role(&self, name: &str) -> bool {
        self.snapshot.read().await.roles.has_role(name)
    }

    /// Returns a copy of the fetch control flags.
    pub async fn status(&self) -> FetchStatus {
        self.snapshot.read().await.status.clone()
    }

    /// Returns whether a fetch is in flight.
    pub async fn is_loading(&self) -> bool {
        self.snapshot.read().await.status.loading
    }

    /// Returns the error recorded by the last fetch.
    pub async fn last_error(&self) -> Option<AppError> {
        self.snapshot.read().await.status.error.clone()
    }

    /// Returns whether a fetch has completed since the last clear.
    pub async fn is_fetched(&self) -> bool {
        self.snapshot.read().await.status.fetched
    }
}
