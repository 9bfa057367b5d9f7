//! Repository contracts the core depends on.
//!
//! Adapters live in `rolegate-infra`. Every method is async and may suspend;
//! a failed call fails the whole operation that issued it.

use std::sync::Arc;

use async_trait::async_trait;

use rolegate_core::{DomainResult, UserId};

use crate::{Role, User};

/// Read-only user lookup.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
}

/// User lookup plus the role-management operations.
#[async_trait]
pub trait UserManagementRepository: UserRepository {
    /// Persist `role` for user `id` and return the updated record.
    ///
    /// Fails with `NotFound` if the user no longer exists.
    async fn update_user_role(&self, id: &UserId, role: Role) -> DomainResult<User>;

    /// Number of users currently holding the admin role.
    async fn count_admins(&self) -> DomainResult<u64>;

    /// Persist a non-admin `role` for user `id`, re-reading the user's current
    /// role at commit time.
    ///
    /// If the user is an admin at that moment, the write only happens when
    /// another admin remains. The read, the admin count and the write must be
    /// one atomic step: two concurrent demotions of the last two admins must
    /// not both succeed. Fails with `Forbidden` when the write would leave no
    /// admin.
    async fn demote_admin(&self, id: &UserId, role: Role) -> DomainResult<User>;
}

#[async_trait]
impl<R> UserRepository for Arc<R>
where
    R: UserRepository + ?Sized,
{
    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        (**self).find_by_email(email).await
    }
}

#[async_trait]
impl<R> UserManagementRepository for Arc<R>
where
    R: UserManagementRepository + ?Sized,
{
    async fn update_user_role(&self, id: &UserId, role: Role) -> DomainResult<User> {
        (**self).update_user_role(id, role).await
    }

    async fn count_admins(&self) -> DomainResult<u64> {
        (**self).count_admins().await
    }

    async fn demote_admin(&self, id: &UserId, role: Role) -> DomainResult<User> {
        (**self).demote_admin(id, role).await
    }
}
