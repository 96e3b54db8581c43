//! Navigation guard backed by a short-lived identity cache.
//!
//! Every navigation resolves the session user before the route is
//! committed. Identity lookups are cached for [`DEFAULT_AUTH_CACHE_TTL_MS`];
//! navigations starting from the initial state, from an unnamed route or from
//! the login page bypass the cache. Lookup failures resolve to `Guest`, so
//! protected routes fail closed.

use std::sync::Arc;

use smartpro_core::SessionUser;
use smartpro_domain::{NavigationDecision, NavigationOrigin, RoutePath};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{Clock, SessionApi};

/// Identity cache lifetime in milliseconds.
pub const DEFAULT_AUTH_CACHE_TTL_MS: i64 = 60_000;

/// Paths and cache lifetime used by the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Paths reachable without authentication.
    pub public_pages: Vec<RoutePath>,
    /// Where unauthenticated users are sent.
    pub login_path: RoutePath,
    /// Where authenticated users visiting the login page are sent.
    pub home_path: RoutePath,
    /// Identity cache lifetime in milliseconds.
    pub ttl_ms: i64,
}

impl GateConfig {
    /// Creates a config whose only public page is the login page.
    #[must_use]
    pub fn new(login_path: impl Into<RoutePath>, home_path: impl Into<RoutePath>) -> Self {
        let login_path = login_path.into();
        Self {
            public_pages: vec![login_path.clone()],
            login_path,
            home_path: home_path.into(),
            ttl_ms: DEFAULT_AUTH_CACHE_TTL_MS,
        }
    }

    fn is_public(&self, path: &RoutePath) -> bool {
        self.public_pages.contains(path)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new("/smart-pro/login", "/smart-pro/home")
    }
}

#[derive(Debug, Default)]
struct AuthCache {
    user: Option<SessionUser>,
    timestamp_ms: i64,
}

impl AuthCache {
    fn fresh_user(&self, now_ms: i64, ttl_ms: i64) -> Option<&SessionUser> {
        self.user
            .as_ref()
            .filter(|_| now_ms.saturating_sub(self.timestamp_ms) < ttl_ms)
    }
}

/// Authentication gate consulted before every route change.
pub struct AuthGate {
    api: Arc<dyn SessionApi>,
    clock: Arc<dyn Clock>,
    config: GateConfig,
    cache: RwLock<AuthCache>,
    in_flight: Mutex<()>,
}

impl AuthGate {
    /// Creates a gate with an empty identity cache.
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>, clock: Arc<dyn Clock>, config: GateConfig) -> Self {
        Self {
            api,
            clock,
            config,
            cache: RwLock::new(AuthCache::default()),
            in_flight: Mutex::new(()),
        }
    }

    /// Returns the guard configuration.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Decides whether a navigation from `from` to `to` may proceed.
    pub async fn before_each(&self, to: &RoutePath, from: &NavigationOrigin) -> NavigationDecision {
        let auth_required = !self.config.is_public(to);
        let force_refresh = !from.is_named() || from.path() == Some(&self.config.login_path);
        let user = self.resolve_user(force_refresh).await;

        if auth_required && !user.is_authenticated() {
            info!(to = %to, "unauthenticated navigation redirected to login");
            return NavigationDecision::Redirect(self.config.login_path.clone());
        }

        if *to == self.config.login_path && user.is_authenticated() {
            info!(user = %user, "authenticated user redirected away from login");
            return NavigationDecision::Redirect(self.config.home_path.clone());
        }

        NavigationDecision::Allow
    }

    /// Resolves the session user, serving a fresh cache entry when allowed.
    ///
    /// A failed lookup yields `Guest` and leaves the cache untouched.
    pub async fn resolve_user(&self, force_refresh: bool) -> SessionUser {
        if !force_refresh && let Some(user) = self.cached_user().await {
            debug!(user = %user, "serving cached session user");
            return user;
        }

        let _in_flight = self.in_flight.lock().await;
        if !force_refresh && let Some(user) = self.cached_user().await {
            return user;
        }

        let now_ms = self.clock.now_millis();
        match self.api.get_logged_user().await {
            Ok(payload) => {
                let user = SessionUser::from_transport(payload.message.as_deref());
                let mut cache = self.cache.write().await;
                cache.user = Some(user.clone());
                cache.timestamp_ms = now_ms;
                debug!(user = %user, "session user resolved");
                user
            }
            Err(error) => {
                warn!(error = %error, "failed to resolve session user, treating as guest");
                SessionUser::Guest
            }
        }
    }

    /// Returns the cached user if it is still within the TTL.
    pub async fn cached_user(&self) -> Option<SessionUser> {
        let now_ms = self.clock.now_millis();
        self.cache
            .read()
            .await
            .fresh_user(now_ms, self.config.ttl_ms)
            .cloned()
    }

    /// Forgets the cached identity so the next navigation asks the backend.
    ///
    /// Waits for an in-flight lookup so its result cannot repopulate the cache.
    pub async fn clear_auth_cache(&self) {
        let _in_flight = self.in_flight.lock().await;
        let mut cache = self.cache.write().await;
        cache.user = None;
        cache.timestamp_ms = 0;
    }
}

#[cfg(test)]
mod tests;
