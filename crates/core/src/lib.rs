//! Shared primitives for all Rust crates in Smart Pro.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{GUEST_SENTINEL, SessionUser};

/// Result type used across Smart Pro crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
///
/// Cloneable so session stores can keep the last failure around for readers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// User is not authenticated or credentials were rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Remote call failed before a usable response was produced.
    #[error("transport error: {0}")]
    Transport(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
