//! Application services and ports.

#![forbid(unsafe_code)]

mod auth_gate;
mod fetch_status;
mod permission_store;
mod role_store;
mod router;
mod session_context;
mod session_ports;

pub use auth_gate::{AuthGate, DEFAULT_AUTH_CACHE_TTL_MS, GateConfig};
pub use fetch_status::FetchStatus;
pub use permission_store::PermissionStore;
pub use role_store::RoleStore;
pub use router::{MAX_GUARD_REDIRECTS, NavigationOutcome, Router};
pub use session_context::SessionContext;
pub use session_ports::{
    AuthenticationApi, Clock, LoggedUserPayload, LoginPayload, SessionApi, SystemClock,
    UserPermissionsPayload, UserRolesPayload,
};
