//! `rolegate-auth`: the authorization decision engine.
//!
//! Role and action vocabulary, ability resolution, the policy guard and the
//! role-change rules. This crate is intentionally decoupled from HTTP and
//! storage: repositories are reached through the traits in [`ports`].

pub mod ability;
pub mod action;
pub mod authorize;
pub mod factory;
pub mod get_user;
pub mod guard;
pub mod ports;
pub mod principal;
pub mod role_change;
pub mod roles;
pub mod service;
pub mod subject;
pub mod user;

#[cfg(test)]
mod testing;

pub use ability::{Ability, AbilityBuilder, Rule};
pub use action::{Action, UnknownAction};
pub use authorize::{AuthorizationExplanation, PolicyRegistry, explain_authorization};
pub use factory::{AbilityFactory, RoleAbilityFactory, role_rules};
pub use get_user::GetUserUseCase;
pub use guard::{PolicyGuard, PolicyHandler, RequiresPolicies, evaluate_policies, policy, require};
pub use ports::{UserManagementRepository, UserRepository};
pub use principal::Principal;
pub use role_change::{UpdateUserRole, UpdateUserRoleUseCase};
pub use roles::{InvalidRole, Role};
pub use service::AuthorizationService;
pub use subject::Subject;
pub use user::{User, UserProfile};
