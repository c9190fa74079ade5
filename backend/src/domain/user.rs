//! User accounts and roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Validation failures for user drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Names must carry text.
    #[error("user name must not be empty")]
    EmptyName,
    /// Emails must at least look like an address.
    #[error("email `{email}` is not a valid address")]
    InvalidEmail { email: String },
    /// Roles are limited to `user` and `admin`.
    #[error("unknown role `{role}`; expected user or admin")]
    UnknownRole { role: String },
}

/// Authorisation role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular customer account.
    #[default]
    User,
    /// Administrator; receives stock alerts.
    Admin,
}

impl UserRole {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole {
                role: other.to_owned(),
            }),
        }
    }
}

/// A persisted user account.
///
/// The password hash is stored opaquely and never serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
    #[serde(skip)]
    pub password_hash: Option<String>,
}

/// Field values for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
    pub password_hash: Option<String>,
}

impl UserDraft {
    /// Check the draft against the account rules.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if !self.email.contains('@') || self.email.trim() != self.email {
            return Err(UserValidationError::InvalidEmail {
                email: self.email.clone(),
            });
        }
        Ok(())
    }
}
