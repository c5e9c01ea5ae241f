//! Shared primitives for all Rust crates in the scope auditor.

#![forbid(unsafe_code)]

/// Credential primitives shared across services.
pub mod auth;
/// Remote admin API error codes and messages.
pub mod remote;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::AccessToken;
pub use remote::{RemoteApiError, RemoteErrorKind};

/// Result type used across scope auditor crates.
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
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or malformed caller configuration (credentials, config files).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure reported by, or while talking to, the remote admin API.
    #[error(transparent)]
    Remote(#[from] RemoteApiError),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the remote error when this error originated from the admin API.
    #[must_use]
    pub fn as_remote(&self) -> Option<&RemoteApiError> {
        match self {
            Self::Remote(error) => Some(error),
            _ => None,
        }
    }
}
