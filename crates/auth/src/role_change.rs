//! Role-change use case.
//!
//! A state transition on the target user's role, protected by an ordered
//! sequence of guards. The first violated guard wins.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use rolegate_core::{DomainError, DomainResult, UserId};

use crate::{Principal, Role, UserManagementRepository, UserProfile};

pub const ONLY_ADMINS_MESSAGE: &str = "Only administrators can update user roles";
pub const SELF_CHANGE_MESSAGE: &str = "You cannot change your own role";
pub const LAST_ADMIN_MESSAGE: &str = "Cannot remove the last administrator from the system";

/// Request to move `target_user_id` to `new_role`.
///
/// `new_role` is kept raw: an unknown value is a forbidden operation, not a
/// separate validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRole {
    pub acting_user_id: UserId,
    pub acting_user_role: Role,
    pub target_user_id: UserId,
    pub new_role: String,
}

impl UpdateUserRole {
    pub fn new(
        acting_user_id: impl Into<UserId>,
        acting_user_role: Role,
        target_user_id: impl Into<UserId>,
        new_role: impl Into<String>,
    ) -> Self {
        Self {
            acting_user_id: acting_user_id.into(),
            acting_user_role,
            target_user_id: target_user_id.into(),
            new_role: new_role.into(),
        }
    }

    /// Request issued by an authenticated caller.
    pub fn by(
        actor: &Principal,
        target_user_id: impl Into<UserId>,
        new_role: impl Into<String>,
    ) -> Self {
        Self::new(
            actor.user_id.clone(),
            actor.role,
            target_user_id,
            new_role,
        )
    }
}

/// Updates a user's role while keeping at least one administrator.
///
/// # Guards (in order)
/// 1. The actor must be an admin.
/// 2. The actor may not target themself.
/// 3. The new role must be a known role.
/// 4. The target must exist.
/// 5. Demoting an admin requires another admin to remain (count taken now,
///    target included).
///
/// Every commit to a non-admin role goes through
/// [`UserManagementRepository::demote_admin`], which re-reads the target and
/// repeats the admin check atomically with the write. The target read at
/// guard 4 may be stale by then (promoted to sole admin in the meantime), so
/// only promotions to admin use the unchecked
/// [`UserManagementRepository::update_user_role`].
#[derive(Debug, Clone)]
pub struct UpdateUserRoleUseCase<R> {
    users: R,
}

impl<R> UpdateUserRoleUseCase<R>
where
    R: UserManagementRepository,
{
    pub fn new(users: R) -> Self {
        Self { users }
    }

    #[instrument(
        skip(self, cmd),
        fields(
            actor = %cmd.acting_user_id,
            target = %cmd.target_user_id,
            new_role = %cmd.new_role
        ),
        err
    )]
    pub async fn execute(&self, cmd: UpdateUserRole) -> DomainResult<UserProfile> {
        if !cmd.acting_user_role.is_admin() {
            warn!(actor_role = %cmd.acting_user_role, "non-admin attempted role change");
            return Err(DomainError::forbidden(ONLY_ADMINS_MESSAGE));
        }

        if cmd.acting_user_id == cmd.target_user_id {
            return Err(DomainError::forbidden(SELF_CHANGE_MESSAGE));
        }

        let new_role: Role = cmd
            .new_role
            .parse()
            .map_err(|e: crate::InvalidRole| DomainError::forbidden(e.to_string()))?;

        let target = self
            .users
            .find_by_id(&cmd.target_user_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("User with ID {} not found", cmd.target_user_id))
            })?;

        let demotes_admin = target.is_admin() && !new_role.is_admin();
        if demotes_admin {
            let admins = self.users.count_admins().await?;
            if admins <= 1 {
                warn!(admins, "refusing to demote the last administrator");
                return Err(DomainError::forbidden(LAST_ADMIN_MESSAGE));
            }
        }

        let updated = if new_role.is_admin() {
            self.users.update_user_role(&target.id, new_role).await?
        } else {
            self.users.demote_admin(&target.id, new_role).await?
        };

        info!(from = %target.role, to = %updated.role, "user role updated");
        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rolegate_core::ErrorKind;

    use super::*;
    use crate::User;
    use crate::testing::StubDirectory;

    fn use_case(dir: &Arc<StubDirectory>) -> UpdateUserRoleUseCase<Arc<StubDirectory>> {
        UpdateUserRoleUseCase::new(dir.clone())
    }

    #[tokio::test]
    async fn admin_can_promote_a_user() {
        let dir = Arc::new(StubDirectory::seeded());
        let profile = use_case(&dir)
            .execute(UpdateUserRole::new("admin-1", Role::Admin, "user-1", "editor"))
            .await
            .unwrap();
        assert_eq!(profile.id, UserId::from("user-1"));
        assert_eq!(profile.email, "user@example.com");
        assert_eq!(profile.role, Role::Editor);
        assert_eq!(dir.role_of("user-1"), Some(Role::Editor));
    }

    #[tokio::test]
    async fn non_admin_actors_are_forbidden() {
        let dir = Arc::new(StubDirectory::seeded());
        for role in [Role::User, Role::Editor] {
            let err = use_case(&dir)
                .execute(UpdateUserRole::new("editor-1", role, "user-1", "editor"))
                .await
                .unwrap_err();
            assert_eq!(err, DomainError::forbidden(ONLY_ADMINS_MESSAGE));
        }
        assert_eq!(dir.role_of("user-1"), Some(Role::User));
    }

    #[tokio::test]
    async fn admin_cannot_change_own_role() {
        let dir = Arc::new(StubDirectory::seeded());
        let err = use_case(&dir)
            .execute(UpdateUserRole::new("admin-1", Role::Admin, "admin-1", "user"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::forbidden(SELF_CHANGE_MESSAGE));
    }

    #[tokio::test]
    async fn unknown_role_is_forbidden() {
        let dir = Arc::new(StubDirectory::seeded());
        let err = use_case(&dir)
            .execute(UpdateUserRole::new("admin-1", Role::Admin, "user-1", "invalid"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.to_string(), "Invalid role: invalid");

        // Checked before the target lookup.
        let err = use_case(&dir)
            .execute(UpdateUserRole::new("admin-1", Role::Admin, "ghost", "invalid"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let dir = Arc::new(StubDirectory::seeded());
        let err = use_case(&dir)
            .execute(UpdateUserRole::new("admin-1", Role::Admin, "ghost", "editor"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("User with ID ghost not found"));
    }

    #[tokio::test]
    async fn sole_admin_cannot_be_demoted() {
        let dir = Arc::new(StubDirectory::default());
        dir.add(User::new("admin-1", "admin@example.com", "Admin", Role::Admin));
        // A stale session still carrying the admin role.
        dir.add(User::new("former-admin", "former@example.com", "Former", Role::User));

        let err = use_case(&dir)
            .execute(UpdateUserRole::new("former-admin", Role::Admin, "admin-1", "user"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::forbidden(LAST_ADMIN_MESSAGE));
        assert_eq!(dir.role_of("admin-1"), Some(Role::Admin));
    }

    #[tokio::test]
    async fn one_of_two_admins_can_be_demoted() {
        let dir = Arc::new(StubDirectory::seeded());
        dir.add(User::new("admin-2", "admin2@example.com", "Second Admin", Role::Admin));

        let profile = use_case(&dir)
            .execute(UpdateUserRole::new("admin-1", Role::Admin, "admin-2", "editor"))
            .await
            .unwrap();
        assert_eq!(profile.role, Role::Editor);
        assert_eq!(dir.role_of("admin-2"), Some(Role::Editor));
    }

    #[tokio::test]
    async fn admin_to_admin_skips_the_count() {
        let dir = Arc::new(StubDirectory::seeded());
        dir.add(User::new("admin-2", "admin2@example.com", "Second Admin", Role::Admin));
        let profile = use_case(&dir)
            .execute(UpdateUserRole::new("admin-1", Role::Admin, "admin-2", "admin"))
            .await
            .unwrap();
        assert_eq!(profile.role, Role::Admin);
    }

    #[tokio::test]
    async fn repository_failure_aborts_without_commit() {
        let dir = Arc::new(StubDirectory::seeded());
        dir.fail_next(DomainError::repository("timeout"));
        let err = use_case(&dir)
            .execute(UpdateUserRole::new("admin-1", Role::Admin, "user-1", "editor"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Repository);
        assert_eq!(dir.role_of("user-1"), Some(Role::User));
    }

    #[tokio::test]
    async fn request_from_principal() {
        let dir = Arc::new(StubDirectory::seeded());
        let actor = Principal::new("admin-1", Role::Admin);
        let profile = use_case(&dir)
            .execute(UpdateUserRole::by(&actor, "editor-1", "user"))
            .await
            .unwrap();
        assert_eq!(profile.role, Role::User);
    }
}
