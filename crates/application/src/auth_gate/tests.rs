use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use smartpro_core::{AppError, AppResult, SessionUser};
use smartpro_domain::{NavigationDecision, NavigationOrigin, RoutePath};
use tokio::sync::{Mutex, Notify};

use crate::{Clock, LoggedUserPayload, SessionApi, UserPermissionsPayload, UserRolesPayload};

use super::{AuthGate, GateConfig};

#[derive(Default)]
struct FakeSessionApi {
    identity_calls: AtomicUsize,
    responses: Mutex<VecDeque<AppResult<LoggedUserPayload>>>,
    release: Option<Arc<Notify>>,
}

impl FakeSessionApi {
    fn scripted(responses: Vec<AppResult<LoggedUserPayload>>) -> Self {
        Self {
            identity_calls: AtomicUsize::new(0),
            responses: Mutex::new(responses.into()),
            release: None,
        }
    }

    fn gated(responses: Vec<AppResult<LoggedUserPayload>>, release: Arc<Notify>) -> Self {
        Self {
            release: Some(release),
            ..Self::scripted(responses)
        }
    }

    fn calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionApi for FakeSessionApi {
    async fn get_user_permissions(&self) -> AppResult<UserPermissionsPayload> {
        Ok(UserPermissionsPayload::default())
    }

    async fn get_user_roles(&self) -> AppResult<UserRolesPayload> {
        Ok(UserRolesPayload::default())
    }

    async fn get_logged_user(&self) -> AppResult<LoggedUserPayload> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(release) = &self.release {
            release.notified().await;
        }
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Transport("no scripted response".to_owned())))
    }
}

#[derive(Default)]
struct FakeClock {
    now_ms: AtomicI64,
}

impl FakeClock {
    fn at(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    fn advance(&self, millis: i64) {
        self.now_ms.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

fn user(name: &str) -> AppResult<LoggedUserPayload> {
    Ok(LoggedUserPayload {
        message: Some(name.to_owned()),
    })
}

fn gate(api: Arc<FakeSessionApi>, clock: Arc<FakeClock>) -> AuthGate {
    AuthGate::new(api, clock, GateConfig::new("/login", "/home"))
}

fn from(path: &str) -> NavigationOrigin {
    NavigationOrigin::route(path, Some("Named"))
}

fn authenticated(name: &str) -> SessionUser {
    SessionUser::from_transport(Some(name))
}

async fn wait_for_calls(api: &FakeSessionApi, calls: usize) {
    while api.calls() < calls {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn guest_is_redirected_to_login() {
    let api = Arc::new(FakeSessionApi::scripted(vec![user("Guest")]));
    let gate = gate(api, Arc::new(FakeClock::at(1_000)));

    let decision = gate
        .before_each(&RoutePath::from("/tasks"), &NavigationOrigin::Initial)
        .await;

    assert_eq!(
        decision,
        NavigationDecision::Redirect(RoutePath::from("/login"))
    );
}

#[tokio::test]
async fn authenticated_user_is_sent_home_from_login() {
    let api = Arc::new(FakeSessionApi::scripted(vec![user("alice@example.com")]));
    let gate = gate(api, Arc::new(FakeClock::at(1_000)));

    let decision = gate
        .before_each(&RoutePath::from("/login"), &NavigationOrigin::Initial)
        .await;

    assert_eq!(
        decision,
        NavigationDecision::Redirect(RoutePath::from("/home"))
    );
}

#[tokio::test]
async fn guest_may_open_login_page() {
    let api = Arc::new(FakeSessionApi::scripted(vec![user("Guest")]));
    let gate = gate(api, Arc::new(FakeClock::at(1_000)));

    let decision = gate
        .before_each(&RoutePath::from("/login"), &NavigationOrigin::Initial)
        .await;

    assert_eq!(decision, NavigationDecision::Allow);
}

#[tokio::test]
async fn authenticated_user_reaches_protected_route() {
    let api = Arc::new(FakeSessionApi::scripted(vec![user("alice@example.com")]));
    let gate = gate(api, Arc::new(FakeClock::at(1_000)));

    let decision = gate
        .before_each(&RoutePath::from("/tasks"), &NavigationOrigin::Initial)
        .await;

    assert_eq!(decision, NavigationDecision::Allow);
}

#[tokio::test]
async fn cache_hit_within_ttl_skips_identity_call() {
    let api = Arc::new(FakeSessionApi::scripted(vec![user("alice@example.com")]));
    let clock = Arc::new(FakeClock::at(1_000));
    let gate = gate(api.clone(), clock.clone());

    gate.before_each(&RoutePath::from("/home"), &NavigationOrigin::Initial)
        .await;
    clock.advance(30_000);
    let decision = gate
        .before_each(&RoutePath::from("/tasks"), &from("/home"))
        .await;

    assert_eq!(decision, NavigationDecision::Allow);
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn expired_cache_triggers_fresh_identity_call() {
    let api = Arc::new(FakeSessionApi::scripted(vec![
        user("alice@example.com"),
        user("alice@example.com"),
    ]));
    let clock = Arc::new(FakeClock::at(1_000));
    let gate = gate(api.clone(), clock.clone());

    gate.before_each(&RoutePath::from("/home"), &NavigationOrigin::Initial)
        .await;
    clock.advance(61_000);
    gate.before_each(&RoutePath::from("/tasks"), &from("/home"))
        .await;

    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn cache_expires_exactly_at_ttl() {
    let api = Arc::new(FakeSessionApi::scripted(vec![
        user("alice@example.com"),
        user("alice@example.com"),
    ]));
    let clock = Arc::new(FakeClock::at(0));
    let gate = gate(api.clone(), clock.clone());

    gate.resolve_user(false).await;
    clock.advance(59_999);
    gate.resolve_user(false).await;
    assert_eq!(api.calls(), 1);

    clock.advance(1);
    gate.resolve_user(false).await;
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn leaving_login_page_forces_refresh() {
    let api = Arc::new(FakeSessionApi::scripted(vec![
        user("Guest"),
        user("alice@example.com"),
    ]));
    let gate = gate(api.clone(), Arc::new(FakeClock::at(1_000)));

    let first = gate
        .before_each(&RoutePath::from("/login"), &NavigationOrigin::Initial)
        .await;
    let second = gate
        .before_each(&RoutePath::from("/home"), &from("/login"))
        .await;

    assert_eq!(first, NavigationDecision::Allow);
    assert_eq!(second, NavigationDecision::Allow);
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn cached_guest_is_a_cache_hit() {
    let api = Arc::new(FakeSessionApi::scripted(vec![user("Guest")]));
    let gate = gate(api.clone(), Arc::new(FakeClock::at(1_000)));

    gate.before_each(&RoutePath::from("/tasks"), &NavigationOrigin::Initial)
        .await;
    let decision = gate
        .before_each(&RoutePath::from("/projects"), &from("/home"))
        .await;

    assert_eq!(
        decision,
        NavigationDecision::Redirect(RoutePath::from("/login"))
    );
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn identity_failure_fails_closed_without_touching_cache() {
    let api = Arc::new(FakeSessionApi::scripted(vec![
        user("alice@example.com"),
        Err(AppError::Transport("offline".to_owned())),
    ]));
    let clock = Arc::new(FakeClock::at(1_000));
    let gate = gate(api.clone(), clock.clone());

    gate.resolve_user(true).await;
    let decision = gate
        .before_each(&RoutePath::from("/tasks"), &from("/login"))
        .await;

    assert_eq!(
        decision,
        NavigationDecision::Redirect(RoutePath::from("/login"))
    );
    let cached = gate.cached_user().await;
    assert_eq!(
        cached.as_ref().map(SessionUser::username),
        Some("alice@example.com")
    );
}

#[tokio::test]
async fn missing_message_resolves_to_guest() {
    let api = Arc::new(FakeSessionApi::scripted(vec![Ok(LoggedUserPayload {
        message: None,
    })]));
    let gate = gate(api, Arc::new(FakeClock::at(1_000)));

    assert_eq!(gate.resolve_user(false).await, SessionUser::Guest);
    assert_eq!(gate.cached_user().await, Some(SessionUser::Guest));
}

#[tokio::test]
async fn clear_auth_cache_forces_next_lookup() {
    let api = Arc::new(FakeSessionApi::scripted(vec![
        user("alice@example.com"),
        user("Guest"),
    ]));
    let gate = gate(api.clone(), Arc::new(FakeClock::at(1_000)));

    gate.resolve_user(false).await;
    gate.clear_auth_cache().await;
    assert_eq!(gate.cached_user().await, None);

    let decision = gate
        .before_each(&RoutePath::from("/tasks"), &from("/home"))
        .await;

    assert_eq!(api.calls(), 2);
    assert_eq!(
        decision,
        NavigationDecision::Redirect(RoutePath::from("/login"))
    );
}

#[tokio::test]
async fn leaving_unnamed_route_forces_refresh() {
    let api = Arc::new(FakeSessionApi::scripted(vec![
        user("alice@example.com"),
        user("alice@example.com"),
    ]));
    let gate = gate(api.clone(), Arc::new(FakeClock::at(1_000)));

    gate.before_each(&RoutePath::from("/home"), &NavigationOrigin::Initial)
        .await;
    let unnamed = NavigationOrigin::route("/nowhere", None);
    let decision = gate.before_each(&RoutePath::from("/tasks"), &unnamed).await;

    assert_eq!(decision, NavigationDecision::Allow);
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn concurrent_lookups_share_one_identity_call() {
    let release = Arc::new(Notify::new());
    let api = Arc::new(FakeSessionApi::gated(
        vec![user("alice@example.com")],
        release.clone(),
    ));
    let gate = Arc::new(gate(api.clone(), Arc::new(FakeClock::at(1_000))));

    let first = tokio::spawn({
        let gate = gate.clone();
        async move { gate.resolve_user(false).await }
    });
    let second = tokio::spawn({
        let gate = gate.clone();
        async move { gate.resolve_user(false).await }
    });
    wait_for_calls(&api, 1).await;
    release.notify_one();
    let (first, second) = tokio::join!(first, second);

    assert_eq!(api.calls(), 1);
    assert_eq!(first.ok(), Some(authenticated("alice@example.com")));
    assert_eq!(second.ok(), Some(authenticated("alice@example.com")));
}

#[tokio::test]
async fn forced_lookup_waits_for_in_flight_call_then_issues_its_own() {
    let release = Arc::new(Notify::new());
    let api = Arc::new(FakeSessionApi::gated(
        vec![user("alice@example.com"), user("bob@example.com")],
        release.clone(),
    ));
    let gate = Arc::new(gate(api.clone(), Arc::new(FakeClock::at(1_000))));

    let cached = tokio::spawn({
        let gate = gate.clone();
        async move { gate.resolve_user(false).await }
    });
    wait_for_calls(&api, 1).await;
    let forced = tokio::spawn({
        let gate = gate.clone();
        async move { gate.resolve_user(true).await }
    });
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    assert_eq!(api.calls(), 1);

    release.notify_one();
    wait_for_calls(&api, 2).await;
    release.notify_one();
    let (cached, forced) = tokio::join!(cached, forced);

    assert_eq!(api.calls(), 2);
    assert_eq!(cached.ok(), Some(authenticated("alice@example.com")));
    assert_eq!(forced.ok(), Some(authenticated("bob@example.com")));
    assert_eq!(
        gate.cached_user().await,
        Some(authenticated("bob@example.com"))
    );
}

#[tokio::test]
async fn clear_during_lookup_leaves_cache_empty() {
    let release = Arc::new(Notify::new());
    let api = Arc::new(FakeSessionApi::gated(
        vec![user("alice@example.com")],
        release.clone(),
    ));
    let gate = Arc::new(gate(api.clone(), Arc::new(FakeClock::at(1_000))));

    let lookup = tokio::spawn({
        let gate = gate.clone();
        async move { gate.resolve_user(true).await }
    });
    wait_for_calls(&api, 1).await;
    let clear = tokio::spawn({
        let gate = gate.clone();
        async move { gate.clear_auth_cache().await }
    });
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    release.notify_one();
    let (lookup, clear) = tokio::join!(lookup, clear);

    assert_eq!(lookup.ok(), Some(authenticated("alice@example.com")));
    assert!(clear.is_ok());
    assert_eq!(gate.cached_user().await, None);
}
