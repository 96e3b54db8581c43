//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod permission;
mod role;
mod route;

pub use permission::{PermissionState, ProjectId};
pub use role::{EMPLOYEE_ROLE, RoleName, RoleSet, TEAM_LEAD_ROLES};
pub use route::{
    NavigationDecision, NavigationOrigin, ResolvedRoute, RoutePath, RouteRecord, RouteTable,
};
