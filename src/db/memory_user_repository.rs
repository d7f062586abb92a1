use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::user_repository::{CreateUserError, UserRepository};
use crate::models::user::{NewUser, PublicUser, User, UserRole};

/// Process-local user store. Backs the server when no `DATABASE_URL` is
/// configured, and every handler test.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
    should_fail: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail like an unreachable database.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.should_fail.store(unavailable, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn set_role(&self, user_id: Uuid, role: UserRole) -> Result<(), sqlx::Error> {
        let mut users = self.users()?;
        let user = users.get_mut(&user_id).ok_or(sqlx::Error::RowNotFound)?;
        user.role = role;
        Ok(())
    }

    #[cfg(test)]
    pub fn remove_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.users()?.remove(&user_id))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.users().expect("user store should be reachable").len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<Uuid, User>>, sqlx::Error> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        self.users
            .lock()
            .map_err(|_| sqlx::Error::Protocol("user store lock poisoned".into()))
    }

    fn insert(users: &mut HashMap<Uuid, User>, new_user: &NewUser) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            name: new_user.name.clone(),
            role: new_user.role,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_public_user_by_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        Ok(self.users()?.get(&user_id).map(PublicUser::from))
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.users()?.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users()?
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        Ok(self.users()?.values().any(|user| user.email == email))
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, CreateUserError> {
        let mut users = self.users()?;
        if users.values().any(|user| user.email == new_user.email) {
            return Err(CreateUserError::DuplicateEmail);
        }
        Ok(Self::insert(&mut users, new_user))
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        let mut users = self.users()?;
        if let Some(user) = users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        let mut users: Vec<User> = self.users()?.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn upsert_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        let mut users = self.users()?;
        if let Some(existing) = users
            .values_mut()
            .find(|user| user.email == new_user.email)
        {
            existing.password_hash = new_user.password_hash.clone();
            existing.name = new_user.name.clone();
            existing.role = new_user.role;
            return Ok(existing.clone());
        }
        Ok(Self::insert(&mut users, new_user))
    }
}
