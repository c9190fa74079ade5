//! User directory service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{UserDirectory, UserRepository, UserRepositoryError};
use crate::domain::{Error, User, UserDraft, UserId, UserValidationError};

/// User service implementing [`UserDirectory`].
#[derive(Clone)]
pub struct UserService<R> {
    repo: Arc<R>,
}

impl<R> UserService<R> {
    /// Create a new service over the user repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("email `{email}` is already registered"))
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
        UserRepositoryError::NotFound { user_id } => {
            Error::not_found(format!("user {user_id} not found"))
                .with_details(json!({ "userId": user_id, "code": "user_not_found" }))
        }
        UserRepositoryError::InUse { user_id } => {
            Error::conflict(format!("user {user_id} still has orders"))
                .with_details(json!({ "userId": user_id, "code": "user_in_use" }))
        }
    }
}

fn invalid_draft(error: UserValidationError) -> Error {
    let field = match error {
        UserValidationError::EmptyName => "name",
        UserValidationError::InvalidEmail { .. } => "email",
        UserValidationError::UnknownRole { .. } => "role",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

#[async_trait]
impl<R> UserDirectory for UserService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error> {
        draft.validate().map_err(invalid_draft)?;
        let user = self.repo.create(&draft).await.map_err(map_user_error)?;
        info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    async fn update_user(&self, user_id: UserId, draft: UserDraft) -> Result<User, Error> {
        draft.validate().map_err(invalid_draft)?;
        let user = self
            .repo
            .update(user_id, &draft)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, role = %user.role, "user updated");
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, Error> {
        self.repo
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| map_user_error(UserRepositoryError::not_found(user_id)))
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.repo.list().await.map_err(map_user_error)
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), Error> {
        self.repo.delete(user_id).await.map_err(map_user_error)?;
        info!(user_id = %user_id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockUserRepository;
    use crate::domain::{ErrorCode, UserRole};

    fn draft(email: &str) -> UserDraft {
        UserDraft {
            name: "Grace".to_owned(),
            email: email.to_owned(),
            role: UserRole::User,
            active: true,
            password_hash: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_malformed_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();
        let service = UserService::new(Arc::new(repo));

        let error = service
            .create_user(draft("not-an-address"))
            .await
            .expect_err("invalid email");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn create_persists_valid_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().times(1).returning(|draft| {
            Ok(User {
                id: UserId::new(5),
                name: draft.name.clone(),
                email: draft.email.clone(),
                role: draft.role,
                active: draft.active,
                password_hash: None,
            })
        });
        let service = UserService::new(Arc::new(repo));

        let user = service
            .create_user(draft("grace@example.com"))
            .await
            .expect("created");

        assert_eq!(user.id, UserId::new(5));
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|draft| Err(UserRepositoryError::duplicate_email(draft.email.clone())));
        let service = UserService::new(Arc::new(repo));

        let error = service
            .create_user(draft("grace@example.com"))
            .await
            .expect_err("duplicate");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn update_revalidates_before_touching_repository() {
        let mut repo = MockUserRepository::new();
        repo.expect_update().never();
        let service = UserService::new(Arc::new(repo));
        let mut blank = draft("grace@example.com");
        blank.name = "   ".to_owned();

        let error = service
            .update_user(UserId::new(5), blank)
            .await
            .expect_err("blank name");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
            Some("name")
        );
    }

    #[tokio::test]
    async fn update_returns_stored_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(|id, draft| *id == UserId::new(5) && draft.role == UserRole::Admin)
            .times(1)
            .returning(|id, draft| {
                Ok(User {
                    id,
                    name: draft.name.clone(),
                    email: draft.email.clone(),
                    role: draft.role,
                    active: draft.active,
                    password_hash: None,
                })
            });
        let service = UserService::new(Arc::new(repo));
        let mut promoted = draft("grace@example.com");
        promoted.role = UserRole::Admin;

        let user = service
            .update_user(UserId::new(5), promoted)
            .await
            .expect("updated");

        assert_eq!(user.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn update_of_missing_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .times(1)
            .returning(|id, _| Err(UserRepositoryError::not_found(id)));
        let service = UserService::new(Arc::new(repo));

        let error = service
            .update_user(UserId::new(9), draft("grace@example.com"))
            .await
            .expect_err("missing");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().times(1).returning(|_| Ok(None));
        let service = UserService::new(Arc::new(repo));

        let error = service
            .get_user(UserId::new(8))
            .await
            .expect_err("missing");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_user_with_orders_is_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete()
            .times(1)
            .returning(|id| Err(UserRepositoryError::in_use(id)));
        let service = UserService::new(Arc::new(repo));

        let error = service
            .delete_user(UserId::new(8))
            .await
            .expect_err("in use");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }
}
