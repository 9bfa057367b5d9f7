//! In-memory user directory for tests/dev.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::instrument;

use rolegate_auth::role_change::LAST_ADMIN_MESSAGE;
use rolegate_auth::{Role, User, UserManagementRepository, UserRepository};
use rolegate_core::{DomainError, DomainResult, UserId};

use crate::config::DirectoryConfig;

/// Map-backed implementation of both user ports.
///
/// Every operation takes the lock once, so `demote_admin` counts admins and
/// writes the new role under the same write guard.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let map = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            inner: RwLock::new(map),
        }
    }

    /// Build the directory from validated seed configuration.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self::with_users(config.users())
    }

    /// Insert or replace a user (registration flows live outside the core).
    pub fn upsert(&self, user: User) -> DomainResult<()> {
        self.write()?.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn len(&self) -> DomainResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, HashMap<UserId, User>>> {
        self.inner
            .read()
            .map_err(|_| DomainError::repository("user directory lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, HashMap<UserId, User>>> {
        self.inner
            .write()
            .map_err(|_| DomainError::repository("user directory lock poisoned"))
    }
}

fn not_found(id: &UserId) -> DomainError {
    DomainError::not_found(format!("User with ID {id} not found"))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let normalized = email.trim().to_lowercase();
        Ok(self
            .read()?
            .values()
            .find(|u| u.email.to_lowercase() == normalized)
            .cloned())
    }
}

#[async_trait]
impl UserManagementRepository for InMemoryUserRepository {
    #[instrument(skip(self), fields(user_id = %id, role = %role), err)]
    async fn update_user_role(&self, id: &UserId, role: Role) -> DomainResult<User> {
        let mut users = self.write()?;
        let user = users.get_mut(id).ok_or_else(|| not_found(id))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn count_admins(&self) -> DomainResult<u64> {
        Ok(self.read()?.values().filter(|u| u.is_admin()).count() as u64)
    }

    #[instrument(skip(self), fields(user_id = %id, role = %role), err)]
    async fn demote_admin(&self, id: &UserId, role: Role) -> DomainResult<User> {
        let mut users = self.write()?;
        let target_is_admin = users.get(id).ok_or_else(|| not_found(id))?.is_admin();

        if target_is_admin && !role.is_admin() {
            let admins = users.values().filter(|u| u.is_admin()).count();
            if admins <= 1 {
                return Err(DomainError::forbidden(LAST_ADMIN_MESSAGE));
            }
        }

        let user = users.get_mut(id).ok_or_else(|| not_found(id))?;
        user.role = role;
        Ok(user.clone())
    }
}
