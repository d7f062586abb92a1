use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::{NewUser, PublicUser, User};

/// User-record collaborator. Email uniqueness is the store's job; a
/// duplicate insert surfaces as `CreateUserError::DuplicateEmail`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_public_user_by_id(&self, user_id: Uuid)
        -> Result<Option<PublicUser>, sqlx::Error>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn create_user(&self, new_user: &NewUser) -> Result<User, CreateUserError>;
    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error>;
    /// Newest first.
    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error>;
    /// Inserts, or overwrites credential, name and role of the account that
    /// already holds `new_user.email`.
    async fn upsert_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error>;
}

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("email is already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for CreateUserError {
    fn from(error: sqlx::Error) -> Self {
        if is_unique_violation(&error) {
            CreateUserError::DuplicateEmail
        } else {
            CreateUserError::Database(error)
        }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db_error| db_error.is_unique_violation())
        .unwrap_or(false)
}
