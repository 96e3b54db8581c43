//! Client router that runs the auth gate before committing a route.

use std::sync::Arc;

use smartpro_core::{AppError, AppResult};
use smartpro_domain::{NavigationDecision, NavigationOrigin, ResolvedRoute, RoutePath, RouteTable};
use tokio::sync::Mutex;
use tracing::debug;

use crate::AuthGate;

/// Guard redirects followed for one navigation before giving up.
pub const MAX_GUARD_REDIRECTS: usize = 8;

/// Result of a committed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Route that was committed.
    pub route: ResolvedRoute,
    /// Guard redirects taken on the way, in order.
    pub redirects: Vec<RoutePath>,
}

/// Session router.
pub struct Router {
    table: RouteTable,
    gate: Arc<AuthGate>,
    current: Mutex<NavigationOrigin>,
}

impl Router {
    /// Creates a router that has not committed any route yet.
    #[must_use]
    pub fn new(table: RouteTable, gate: Arc<AuthGate>) -> Self {
        Self {
            table,
            gate,
            current: Mutex::new(NavigationOrigin::Initial),
        }
    }

    /// Navigates to `path`, honouring every guard redirect.
    ///
    /// A guard redirect starts a new navigation from the same origin.
    pub async fn push(&self, path: &RoutePath) -> AppResult<NavigationOutcome> {
        let from = self.current.lock().await.clone();
        let mut target = self.table.resolve(path);
        let mut redirects = Vec::new();

        loop {
            match self.gate.before_each(&target.path, &from).await {
                NavigationDecision::Allow => break,
                NavigationDecision::Redirect(next) => {
                    if redirects.len() >= MAX_GUARD_REDIRECTS {
                        return Err(AppError::Internal(format!(
                            "navigation to '{path}' exceeded {MAX_GUARD_REDIRECTS} redirects"
                        )));
                    }
                    debug!(from = %target.path, to = %next, "navigation redirected");
                    target = self.table.resolve(&next);
                    redirects.push(next);
                }
            }
        }

        *self.current.lock().await = NavigationOrigin::from(&target);

        Ok(NavigationOutcome {
            route: target,
            redirects,
        })
    }

    /// Returns the last committed route, or `Initial` before the first one.
    pub async fn current(&self) -> NavigationOrigin {
        self.current.lock().await.clone()
    }
}
