//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::{User, UserDraft, UserId, UserRole};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// Another account already uses the email.
        DuplicateEmail { email: String } =>
            "email `{email}` is already registered",
        /// No user row matched the id.
        NotFound { user_id: UserId } =>
            "user {user_id} not found",
        /// Orders still reference the user.
        InUse { user_id: UserId } =>
            "user {user_id} still has orders",
    }
}

/// Port owning user rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return it with its assigned id.
    async fn create(&self, draft: &UserDraft) -> Result<User, UserRepositoryError>;

    /// Replace a user's name, email, role and active flag. The stored
    /// password hash is kept when the draft carries none.
    async fn update(
        &self,
        user_id: UserId,
        draft: &UserDraft,
    ) -> Result<User, UserRepositoryError>;

    /// Find a user by id.
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// List every user ordered by id.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// List users holding `role`, ordered by id.
    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, UserRepositoryError>;

    /// Remove a user together with their notifications.
    async fn delete(&self, user_id: UserId) -> Result<(), UserRepositoryError>;
}
