//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserDraft, UserId, UserRole};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    UserRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserRepositoryError::connection(message),
        DieselFailure::Query(message) | DieselFailure::LockTimeout(message) => {
            UserRepositoryError::query(message)
        }
        other => UserRepositoryError::query(format!("unexpected database failure: {other:?}")),
    }
}

fn row_to_user(row: UserRow) -> User {
    let role = row.role.parse().unwrap_or_else(|_| {
        warn!(value = %row.role, user_id = row.id, "unrecognised role, treating as user");
        UserRole::User
    });
    User {
        id: UserId::new(row.id),
        name: row.name,
        email: row.email,
        role,
        active: row.active,
        password_hash: row.password_hash,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, draft: &UserDraft) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                name: draft.name.trim(),
                email: &draft.email,
                role: draft.role.as_str(),
                active: draft.active,
                password_hash: draft.password_hash.as_deref(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match classify_diesel_error(err) {
                DieselFailure::UniqueViolation { .. } => {
                    UserRepositoryError::duplicate_email(draft.email.clone())
                }
                DieselFailure::Connection(message) => UserRepositoryError::connection(message),
                other => UserRepositoryError::query(format!("user insert failed: {other:?}")),
            })?;

        Ok(row_to_user(row))
    }

    async fn update(
        &self,
        user_id: UserId,
        draft: &UserDraft,
    ) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(users::table.find(user_id.get()))
            .set(&NewUserRow {
                name: draft.name.trim(),
                email: &draft.email,
                role: draft.role.as_str(),
                active: draft.active,
                password_hash: draft.password_hash.as_deref(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match classify_diesel_error(err) {
                DieselFailure::NotFound => UserRepositoryError::not_found(user_id),
                DieselFailure::UniqueViolation { .. } => {
                    UserRepositoryError::duplicate_email(draft.email.clone())
                }
                DieselFailure::Connection(message) => UserRepositoryError::connection(message),
                other => UserRepositoryError::query(format!("user update failed: {other:?}")),
            })?;

        Ok(row_to_user(row))
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(user_id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(role.as_str()))
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    async fn delete(&self, user_id: UserId) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.find(user_id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| match classify_diesel_error(err) {
                DieselFailure::ForeignKeyViolation { .. } => UserRepositoryError::in_use(user_id),
                DieselFailure::Connection(message) => UserRepositoryError::connection(message),
                other => UserRepositoryError::query(format!("user delete failed: {other:?}")),
            })?;

        if deleted == 0 {
            return Err(UserRepositoryError::not_found(user_id));
        }
        Ok(())
    }
}
