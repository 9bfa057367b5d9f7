//! Authorization service: user lookup + ability resolution.

use chrono::Utc;
use tracing::{debug, instrument};

use rolegate_core::{DomainError, DomainResult, UserId};

use crate::authorize::{AuthorizationExplanation, explain_authorization};
use crate::{Ability, AbilityFactory, Action, RoleAbilityFactory, User, UserRepository};

pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// Translates a user id into capabilities.
///
/// Nothing is cached: every call re-reads the user and rebuilds the ability,
/// so a role change takes effect on the next check without any invalidation.
#[derive(Debug, Clone)]
pub struct AuthorizationService<R, F = RoleAbilityFactory> {
    users: R,
    factory: F,
}

impl<R> AuthorizationService<R, RoleAbilityFactory>
where
    R: UserRepository,
{
    pub fn with_role_table(users: R) -> Self {
        Self::new(users, RoleAbilityFactory)
    }
}

impl<R, F> AuthorizationService<R, F>
where
    R: UserRepository,
    F: AbilityFactory,
{
    pub fn new(users: R, factory: F) -> Self {
        Self { users, factory }
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    pub async fn get_user_abilities(&self, user_id: &UserId) -> DomainResult<Ability> {
        let user = self.load_user(user_id).await?;

        let ability = self.factory.create_for_user(&user);
        debug!(role = %user.role, rules = ability.rules().len(), "resolved ability");
        Ok(ability)
    }

    #[instrument(skip(self), fields(user_id = %user_id, action = %action), err)]
    pub async fn check_permission(
        &self,
        user_id: &UserId,
        action: Action,
        subject: &str,
    ) -> DomainResult<bool> {
        let ability = self.get_user_abilities(user_id).await?;
        let allowed = ability.can(action, subject);
        debug!(allowed, "permission checked");
        Ok(allowed)
    }

    /// Like [`check_permission`](Self::check_permission), but returns the full
    /// audit record of the decision.
    #[instrument(skip(self), fields(user_id = %user_id, action = %action), err)]
    pub async fn explain_permission(
        &self,
        user_id: &UserId,
        action: Action,
        subject: &str,
    ) -> DomainResult<AuthorizationExplanation> {
        let user = self.load_user(user_id).await?;
        Ok(explain_authorization(
            &self.factory,
            &user,
            action,
            subject,
            Utc::now(),
        ))
    }

    async fn load_user(&self, user_id: &UserId) -> DomainResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND_MESSAGE))
    }
}
