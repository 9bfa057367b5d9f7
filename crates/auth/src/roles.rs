use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for RBAC.
///
/// Roles form a closed set and carry no implicit privilege order: what a role
/// may do is stated explicitly in the ability factory's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Editor,
    Admin,
}

/// Raised when a string does not name one of the known roles.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid role: {0}")]
pub struct InvalidRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Editor, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "Full system administrator with every permission",
            Role::Editor => "Content editor: reads everything, creates and updates posts",
            Role::User => "Basic user with read access to posts and user profiles",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| InvalidRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn rejects_unknown_role_with_stable_message() {
        let err = "invalid".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid role: invalid");
        assert!("ADMIN".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_wire_form() {
        assert_eq!(serde_json::to_string(&Role::Editor).unwrap(), "\"editor\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
