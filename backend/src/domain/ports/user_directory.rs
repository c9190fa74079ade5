//! Driving port for user account administration.

use async_trait::async_trait;

use crate::domain::{Error, User, UserDraft, UserId};

/// Driving port for user use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Validate and register a user.
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error>;

    /// Validate and apply new field values to an existing user.
    async fn update_user(&self, user_id: UserId, draft: UserDraft) -> Result<User, Error>;

    /// Fetch one user.
    async fn get_user(&self, user_id: UserId) -> Result<User, Error>;

    /// Fetch every user.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Remove a user.
    async fn delete_user(&self, user_id: UserId) -> Result<(), Error>;
}
