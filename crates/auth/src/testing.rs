//! Test doubles for the repository ports.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use rolegate_core::{DomainError, DomainResult, UserId};

use crate::role_change::LAST_ADMIN_MESSAGE;
use crate::{Role, User, UserManagementRepository, UserRepository};

/// Map-backed directory that counts lookups and can be told to fail.
#[derive(Debug, Default)]
pub(crate) struct StubDirectory {
    users: Mutex<BTreeMap<UserId, User>>,
    lookups: AtomicUsize,
    fail_with: Mutex<Option<DomainError>>,
}

impl StubDirectory {
    /// user-1 (user), editor-1 (editor), admin-1 (admin).
    pub(crate) fn seeded() -> Self {
        let dir = Self::default();
        dir.add(User::new("user-1", "user@example.com", "Test User", Role::User));
        dir.add(User::new("editor-1", "editor@example.com", "Test Editor", Role::Editor));
        dir.add(User::new("admin-1", "admin@example.com", "Test Admin", Role::Admin));
        dir
    }

    pub(crate) fn add(&self, user: User) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    pub(crate) fn role_of(&self, id: &str) -> Option<Role> {
        self.users.lock().unwrap().get(&UserId::from(id)).map(|u| u.role)
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next(&self, err: DomainError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    fn take_failure(&self) -> DomainResult<()> {
        match self.fail_with.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for StubDirectory {
    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>> {
        self.take_failure()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.take_failure()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl UserManagementRepository for StubDirectory {
    async fn update_user_role(&self, id: &UserId, role: Role) -> DomainResult<User> {
        self.take_failure()?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("User not found"))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn count_admins(&self) -> DomainResult<u64> {
        self.take_failure()?;
        Ok(self.users.lock().unwrap().values().filter(|u| u.is_admin()).count() as u64)
    }

    async fn demote_admin(&self, id: &UserId, role: Role) -> DomainResult<User> {
        self.take_failure()?;
        let mut users = self.users.lock().unwrap();
        let target_is_admin = users
            .get(id)
            .ok_or_else(|| DomainError::not_found("User not found"))?
            .is_admin();
        let admins = users.values().filter(|u| u.is_admin()).count();
        if target_is_admin && admins <= 1 {
            return Err(DomainError::forbidden(LAST_ADMIN_MESSAGE));
        }
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("User not found"))?;
        user.role = role;
        Ok(user.clone())
    }
}
