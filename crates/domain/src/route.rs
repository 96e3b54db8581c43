//! Client route model used by the navigation guard.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Redirect hops followed inside the route table before giving up.
const MAX_TABLE_REDIRECTS: usize = 8;

/// Normalised client path.
///
/// Query string and fragment are dropped, a leading `/` is ensured and a
/// trailing `/` is removed except for the root path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePath(String);

impl RoutePath {
    /// Normalises a raw path.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self {
        let raw = value.as_ref().trim();
        let without_suffix = raw
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        if without_suffix.is_empty() {
            return Self("/".to_owned());
        }

        if without_suffix.starts_with('/') {
            Self(without_suffix.to_owned())
        } else {
            Self(format!("/{without_suffix}"))
        }
    }

    /// Returns the normalised path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }
}

impl From<&str> for RoutePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Display for RoutePath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Where a navigation attempt starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOrigin {
    /// First navigation of the session; no route has been committed yet.
    Initial,
    /// A previously committed route.
    Route {
        /// Committed path.
        path: RoutePath,
        /// Route name, `None` when the path matched no named route.
        name: Option<&'static str>,
    },
}

impl NavigationOrigin {
    /// Creates an origin for a committed route.
    #[must_use]
    pub fn route(path: impl Into<RoutePath>, name: Option<&'static str>) -> Self {
        Self::Route {
            path: path.into(),
            name,
        }
    }

    /// Returns whether this is the first navigation.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        matches!(self, Self::Initial)
    }

    /// Returns whether the origin is a committed route with a name.
    ///
    /// `Initial` and unknown paths are both unnamed.
    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Route { name: Some(_), .. })
    }

    /// Returns the committed path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&RoutePath> {
        match self {
            Self::Initial => None,
            Self::Route { path, .. } => Some(path),
        }
    }
}

impl From<&ResolvedRoute> for NavigationOrigin {
    fn from(route: &ResolvedRoute) -> Self {
        Self::route(route.path.clone(), route.name)
    }
}

/// Outcome of the navigation guard for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Proceed to the requested path unmodified.
    Allow,
    /// Abort and navigate to the given path instead.
    Redirect(RoutePath),
}

/// One entry of the client route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// Path pattern; segments starting with `:` capture a parameter.
    pub pattern: &'static str,
    /// Route name, absent for pure redirect entries.
    pub name: Option<&'static str>,
    /// Redirect target applied before any guard runs.
    pub redirect: Option<&'static str>,
}

impl RouteRecord {
    /// Creates a named route.
    #[must_use]
    pub const fn named(pattern: &'static str, name: &'static str) -> Self {
        Self {
            pattern,
            name: Some(name),
            redirect: None,
        }
    }

    /// Creates a redirect entry.
    #[must_use]
    pub const fn redirect(pattern: &'static str, target: &'static str) -> Self {
        Self {
            pattern,
            name: None,
            redirect: Some(target),
        }
    }

    fn is_static(&self) -> bool {
        !self.pattern.contains(':')
    }

    fn matches(&self, path: &RoutePath) -> Option<BTreeMap<String, String>> {
        let pattern_segments: Vec<&str> = self
            .pattern
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let path_segments: Vec<&str> = path.segments().collect();

        if pattern_segments.len() != path_segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (pattern, segment) in pattern_segments.iter().zip(path_segments) {
            match pattern.strip_prefix(':') {
                Some(param) => {
                    params.insert(param.to_owned(), segment.to_owned());
                }
                None if *pattern == segment => {}
                None => return None,
            }
        }

        Some(params)
    }
}

/// A path after route-table redirects have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Final path.
    pub path: RoutePath,
    /// Matched route name, `None` for unknown paths.
    pub name: Option<&'static str>,
    /// Captured path parameters.
    pub params: BTreeMap<String, String>,
}

/// Ordered client route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

impl RouteTable {
    /// Creates a route table from records.
    #[must_use]
    pub fn new(records: Vec<RouteRecord>) -> Self {
        Self { records }
    }

    /// Routes of the Smart Pro mobile application.
    #[must_use]
    pub fn smart_pro() -> Self {
        Self::new(vec![
            RouteRecord::redirect("/", "/smart-pro"),
            RouteRecord::redirect("/smart-pro", "/smart-pro/home"),
            RouteRecord::named("/smart-pro/home", "Home"),
            RouteRecord::named("/smart-pro/projects", "Projects"),
            RouteRecord::named("/smart-pro/tasks", "Tasks"),
            RouteRecord::named("/smart-pro/timesheet", "TimeSheet"),
            RouteRecord::named("/smart-pro/date-requests", "DateRequests"),
            RouteRecord::named("/smart-pro/approvals", "Approvals"),
            RouteRecord::named("/smart-pro/connections", "Connections"),
            RouteRecord::named("/smart-pro/notifications", "Notifications"),
            RouteRecord::named("/smart-pro/profile", "Profile"),
            RouteRecord::named("/smart-pro/project/new", "CreateProject"),
            RouteRecord::named("/smart-pro/assignment/new", "CreateAssignment"),
            RouteRecord::named("/smart-pro/project/:id", "ProjectDetail"),
            RouteRecord::named("/smart-pro/task/:id", "TaskDetail"),
            RouteRecord::named("/smart-pro/login", "Login"),
        ])
    }

    /// Resolves a path, following table redirects.
    ///
    /// Static patterns win over parameterised ones. Unknown paths resolve to
    /// themselves with no name.
    #[must_use]
    pub fn resolve(&self, path: &RoutePath) -> ResolvedRoute {
        let mut current = path.clone();

        for _ in 0..MAX_TABLE_REDIRECTS {
            let Some((record, params)) = self.find(&current) else {
                break;
            };

            match record.redirect {
                Some(target) => current = RoutePath::new(target),
                None => {
                    return ResolvedRoute {
                        path: current,
                        name: record.name,
                        params,
                    };
                }
            }
        }

        ResolvedRoute {
            path: current,
            name: None,
            params: BTreeMap::new(),
        }
    }

    fn find(&self, path: &RoutePath) -> Option<(&RouteRecord, BTreeMap<String, String>)> {
        let statics = self.records.iter().filter(|record| record.is_static());
        let dynamics = self.records.iter().filter(|record| !record.is_static());

        statics
            .chain(dynamics)
            .find_map(|record| record.matches(path).map(|params| (record, params)))
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::smart_pro()
    }
}
