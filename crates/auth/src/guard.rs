//! Policy guard: the boundary check in front of protected operations.
//!
//! Policies are plain predicates over an [`Ability`], passed explicitly at the
//! call site (or declared by the operation through [`RequiresPolicies`]).

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use rolegate_core::{DomainError, DomainResult};

use crate::{Ability, AbilityFactory, Action, AuthorizationService, Principal, UserRepository};

pub const UNAUTHENTICATED_MESSAGE: &str = "User not authenticated";
pub const INSUFFICIENT_PERMISSIONS_MESSAGE: &str = "Insufficient permissions";

/// A pure predicate over a resolved ability.
pub type PolicyHandler = Arc<dyn Fn(&Ability) -> bool + Send + Sync>;

/// Wrap a closure as a [`PolicyHandler`].
pub fn policy<F>(f: F) -> PolicyHandler
where
    F: Fn(&Ability) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Policy requiring `action` on `subject`.
pub fn require(action: Action, subject: &'static str) -> PolicyHandler {
    policy(move |ability| ability.can(action, subject))
}

/// Operation-side authorization contract.
///
/// Implement this on operations that carry their own policies; the boundary
/// resolves them and hands them to [`PolicyGuard::authorize_operation`].
pub trait RequiresPolicies {
    fn policies(&self) -> Vec<PolicyHandler>;
}

/// Evaluate every policy against `ability`.
///
/// All policies run even after one has failed; the result is their logical AND.
pub fn evaluate_policies(ability: &Ability, policies: &[PolicyHandler]) -> DomainResult<()> {
    let denied = policies
        .iter()
        .map(|handler| handler(ability))
        .filter(|allowed| !allowed)
        .count();

    if denied == 0 {
        Ok(())
    } else {
        warn!(denied, total = policies.len(), "policy check denied");
        Err(DomainError::forbidden(INSUFFICIENT_PERMISSIONS_MESSAGE))
    }
}

/// Reusable interception point for protected operations.
///
/// The guard has no knowledge of the operation it protects, only of the
/// outcome of its policies.
pub struct PolicyGuard<R, F> {
    service: Arc<AuthorizationService<R, F>>,
}

impl<R, F> Clone for PolicyGuard<R, F> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<R, F> PolicyGuard<R, F>
where
    R: UserRepository,
    F: AbilityFactory,
{
    pub fn new(service: Arc<AuthorizationService<R, F>>) -> Self {
        Self { service }
    }

    /// Allow or deny a call.
    ///
    /// A missing principal fails with `Unauthenticated` before any policy
    /// runs, even when the list is empty; operations without requirements are
    /// simply not routed through the guard. The caller's ability is resolved
    /// fresh for this call.
    #[instrument(skip(self, principal, policies), fields(policies = policies.len()), err)]
    pub async fn authorize(
        &self,
        principal: Option<&Principal>,
        policies: &[PolicyHandler],
    ) -> DomainResult<()> {
        let Some(principal) = principal else {
            warn!("no authenticated principal");
            return Err(DomainError::unauthenticated(UNAUTHENTICATED_MESSAGE));
        };

        let ability = self.service.get_user_abilities(&principal.user_id).await?;
        evaluate_policies(&ability, policies)?;
        debug!(user_id = %principal.user_id, "policies satisfied");
        Ok(())
    }

    pub async fn authorize_operation<O>(
        &self,
        principal: Option<&Principal>,
        operation: &O,
    ) -> DomainResult<()>
    where
        O: RequiresPolicies + ?Sized,
    {
        self.authorize(principal, &operation.policies()).await
    }
}
