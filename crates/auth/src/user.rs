//! User identity records as seen by the authorization core.
//!
//! Users are created and deleted by external flows; the core only reads them
//! and, for role changes, asks the repository to update the role.

use serde::{Deserialize, Serialize};

use rolegate_core::UserId;

use crate::Role;

/// A user record.
///
/// # Invariants
/// - `id` is unique and immutable.
/// - `email` is unique.
/// - A user has exactly one role at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl User {
    pub fn new(
        id: impl Into<UserId>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Same user with a different role.
    pub fn with_role(self, role: Role) -> Self {
        Self { role, ..self }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self.clone())
    }
}

/// Projection returned to callers of user-facing use cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}
