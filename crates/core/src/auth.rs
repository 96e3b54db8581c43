use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::NonEmptyString;

/// Username the backend reports for an unauthenticated session.
pub const GUEST_SENTINEL: &str = "Guest";

/// Identity resolved for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionUser {
    /// No authenticated user.
    Guest,
    /// Logged-in user, identified by the backend username (usually an email).
    Authenticated(NonEmptyString),
}

impl SessionUser {
    /// Interprets a username reported by the backend.
    ///
    /// Missing, blank and `"Guest"` values all map to [`SessionUser::Guest`].
    #[must_use]
    pub fn from_transport(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(name) if name != GUEST_SENTINEL => NonEmptyString::new(name)
                .map(Self::Authenticated)
                .unwrap_or(Self::Guest),
            _ => Self::Guest,
        }
    }

    /// Returns whether this identity belongs to a logged-in user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the backend username, or `"Guest"`.
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Guest => GUEST_SENTINEL,
            Self::Authenticated(name) => name.as_str(),
        }
    }
}

impl Display for SessionUser {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.username())
    }
}
