//! Fetch-once cache of the current user's permission flags.

use std::sync::Arc;

use smartpro_core::AppError;
use smartpro_domain::{PermissionState, ProjectId};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{FetchStatus, SessionApi};

#[derive(Debug, Default)]
struct PermissionSnapshot {
    permissions: PermissionState,
    status: FetchStatus,
}

/// Session-scoped permission store.
///
/// Construct one per session and share it behind an `Arc`; `clear` resets it
/// at logout.
pub struct PermissionStore {
    api: Arc<dyn SessionApi>,
    snapshot: RwLock<PermissionSnapshot>,
    in_flight: Mutex<()>,
}

impl PermissionStore {
    /// Creates a store holding the default (restrictive) permissions.
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        Self {
            api,
            snapshot: RwLock::new(PermissionSnapshot::default()),
            in_flight: Mutex::new(()),
        }
    }

    /// Returns the permissions, fetching them on the first call.
    ///
    /// Never fails: a transport error is recorded in the status, the last
    /// known permissions are kept and the store is still marked fetched.
    /// Callers arriving while a fetch is in flight wait for it instead of
    /// issuing their own call.
    pub async fn fetch_permissions(&self) -> PermissionState {
        if let Some(cached) = self.cached().await {
            debug!("serving cached user permissions");
            return cached;
        }

        let _in_flight = self.in_flight.lock().await;
        if let Some(cached) = self.cached().await {
            return cached;
        }

        {
            let mut snapshot = self.snapshot.write().await;
            snapshot.status.loading = true;
            snapshot.status.error = None;
        }

        let result = self.api.get_user_permissions().await;

        let mut snapshot = self.snapshot.write().await;
        match result {
            Ok(payload) => {
                if payload.success {
                    snapshot.permissions = payload.into_permission_state();
                } else {
                    debug!(
                        message = payload.message.as_deref().unwrap_or_default(),
                        "permission lookup reported failure, keeping defaults"
                    );
                }
                info!(
                    has_full_access = snapshot.permissions.has_full_access,
                    is_project_manager = snapshot.permissions.is_project_manager,
                    managed_projects = snapshot.permissions.managed_projects.len(),
                    "user permissions fetched"
                );
            }
            Err(error) => {
                warn!(error = %error, "failed to fetch user permissions");
                snapshot.status.error = Some(error);
            }
        }
        snapshot.status.fetched = true;
        snapshot.status.loading = false;

        snapshot.permissions.clone()
    }

    /// Resets permissions to defaults and re-enables fetching.
    ///
    /// Waits for an in-flight fetch so its result cannot land after the reset.
    pub async fn clear(&self) {
        let _in_flight = self.in_flight.lock().await;
        let mut snapshot = self.snapshot.write().await;
        snapshot.permissions = PermissionState::default();
        snapshot.status.fetched = false;
    }

    /// Returns the current permissions without fetching.
    pub async fn permissions(&self) -> PermissionState {
        self.snapshot.read().await.permissions.clone()
    }

    /// Returns whether the user has read-only access to all records.
    pub async fn has_full_access(&self) -> bool {
        self.snapshot.read().await.permissions.has_full_access
    }

    /// Returns whether the user approves timesheets for managed projects.
    pub async fn is_project_manager(&self) -> bool {
        self.snapshot.read().await.permissions.is_project_manager
    }

    /// Returns the projects managed by the user.
    pub async fn managed_projects(&self) -> Vec<ProjectId> {
        self.snapshot
            .read()
            .await
            .permissions
            .managed_projects
            .clone()
    }

    /// Returns whether the user may approve timesheets for `project`.
    pub async fn can_approve(&self, project: &ProjectId) -> bool {
        self.snapshot.read().await.permissions.can_approve(project)
    }

    /// Returns whether an item owned by or assigned to someone is read-only.
    pub async fn is_read_only(&self, owner_or_assignee: &str) -> bool {
        self.snapshot
            .read()
            .await
            .permissions
            .is_read_only(owner_or_assignee)
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

    async fn cached(&self) -> Option<PermissionState> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .status
            .fetched
            .then(|| snapshot.permissions.clone())
    }
}
