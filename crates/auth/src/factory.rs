//! Role → ability resolution.
//!
//! Every role's grants are spelled out in one table row; nothing is inherited
//! from another role, so auditing a role means reading its row.

use crate::{Ability, Action, Role, Rule, Subject, User};

const ADMIN_RULES: &[Rule] = &[Rule::new(Action::Manage, Subject::ALL)];

const EDITOR_RULES: &[Rule] = &[
    Rule::new(Action::Read, Subject::ALL),
    Rule::new(Action::Create, Subject::POST),
    Rule::new(Action::Update, Subject::POST),
];

const USER_RULES: &[Rule] = &[
    Rule::new(Action::Read, Subject::POST),
    Rule::new(Action::Read, Subject::USER),
];

/// Rules granted to `role`.
pub fn role_rules(role: Role) -> &'static [Rule] {
    match role {
        Role::Admin => ADMIN_RULES,
        Role::Editor => EDITOR_RULES,
        Role::User => USER_RULES,
    }
}

/// Builds the ability of a user.
///
/// Implementations must be pure functions of the user's role and must never
/// fail.
pub trait AbilityFactory: Send + Sync {
    fn create_for_user(&self, user: &User) -> Ability;
}

/// Factory backed by the static [`role_rules`] table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAbilityFactory;

impl RoleAbilityFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn create_for_role(&self, role: Role) -> Ability {
        let mut builder = Ability::builder();
        for rule in role_rules(role) {
            builder.grant(rule.clone());
        }
        builder.build()
    }
}

impl AbilityFactory for RoleAbilityFactory {
    fn create_for_user(&self, user: &User) -> Ability {
        self.create_for_role(user.role)
    }
}

impl<F> AbilityFactory for std::sync::Arc<F>
where
    F: AbilityFactory + ?Sized,
{
    fn create_for_user(&self, user: &User) -> Ability {
        (**self).create_for_user(user)
    }
}
