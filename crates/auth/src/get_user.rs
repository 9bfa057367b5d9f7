use tracing::instrument;

use rolegate_core::{DomainError, DomainResult, UserId};

use crate::{UserProfile, UserRepository};

/// Look up a user's profile, including their role.
#[derive(Debug, Clone)]
pub struct GetUserUseCase<R> {
    users: R,
}

impl<R> GetUserUseCase<R>
where
    R: UserRepository,
{
    pub fn new(users: R) -> Self {
        Self { users }
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    pub async fn execute(&self, user_id: &UserId) -> DomainResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| DomainError::not_found(format!("User with ID {user_id} not found")))
    }
}
