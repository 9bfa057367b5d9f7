//! Authorization explanations and the role registry (audit trail).

use chrono::{DateTime, Utc};
use serde::Serialize;

use rolegate_core::UserId;

use crate::{AbilityFactory, Action, Role, RoleAbilityFactory, Rule, User, role_rules};

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// Answers "why was this request allowed or denied?" without changing the
/// decision itself: `granted` always equals `ability.can(action, subject)`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub user_id: UserId,
    pub role: Role,
    pub action: Action,
    pub subject: String,
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// The rule that granted the request, if any.
    pub matched_rule: Option<Rule>,

    /// Every rule the user's role grants.
    pub effective_rules: Vec<Rule>,

    /// If denied, what was missing.
    pub denial_reason: Option<DenialReason>,

    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub message: String,
    /// Roles whose rules would grant the request.
    pub granting_roles: Vec<Role>,
    pub suggestions: Vec<String>,
}

/// Explain the decision `factory` makes for `user` on `(action, subject)`.
pub fn explain_authorization<F>(
    factory: &F,
    user: &User,
    action: Action,
    subject: &str,
    now: DateTime<Utc>,
) -> AuthorizationExplanation
where
    F: AbilityFactory + ?Sized,
{
    let ability = factory.create_for_user(user);
    let matched_rule = ability.relevant_rule(action, subject).cloned();
    let effective_rules = ability.rules().to_vec();

    let (granted, reason, denial_reason) = match &matched_rule {
        Some(rule) => (
            true,
            format!("Role '{}' grants {}", user.role, rule),
            None,
        ),
        None => {
            let granting_roles = PolicyRegistry::new().roles_granting(action, subject);
            let mut suggestions = Vec::new();
            if !granting_roles.is_empty() {
                let names: Vec<&str> = granting_roles.iter().map(|r| r.as_str()).collect();
                suggestions.push(format!(
                    "Ask an administrator to assign one of: {}",
                    names.join(", ")
                ));
            }
            if subject == "all" && !action.is_wildcard() {
                suggestions.push(format!(
                    "Queries on 'all' need a rule on 'all'; check '{action}' on a concrete subject instead"
                ));
            }
            (
                false,
                format!(
                    "Role '{}' has no rule granting {} on {}",
                    user.role, action, subject
                ),
                Some(DenialReason {
                    message: format!("Missing permission: {action} on {subject}"),
                    granting_roles,
                    suggestions,
                }),
            )
        }
    };

    AuthorizationExplanation {
        user_id: user.id.clone(),
        role: user.role,
        action,
        subject: subject.to_string(),
        granted,
        reason,
        matched_rule,
        effective_rules,
        denial_reason,
        evaluated_at: now,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Role definition with its granted rules (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub description: &'static str,
    pub rules: Vec<Rule>,
}

/// Complete view of the role table.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyRegistry {
    pub roles: Vec<RoleDefinition>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        let roles = Role::ALL
            .into_iter()
            .map(|role| RoleDefinition {
                role,
                description: role.description(),
                rules: role_rules(role).to_vec(),
            })
            .collect();
        Self { roles }
    }

    pub fn role(&self, role: Role) -> Option<&RoleDefinition> {
        self.roles.iter().find(|def| def.role == role)
    }

    /// Roles whose abilities allow `action` on `subject`.
    pub fn roles_granting(&self, action: Action, subject: &str) -> Vec<Role> {
        self.roles
            .iter()
            .filter(|def| {
                RoleAbilityFactory
                    .create_for_role(def.role)
                    .can(action, subject)
            })
            .map(|def| def.role)
            .collect()
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
