use serde::{Deserialize, Serialize};

use rolegate_core::UserId;

use crate::Role;

/// Identity of an authenticated caller.
///
/// Sessions are validated by the external identity provider; the boundary
/// hands the core the resulting user id and the role the session carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}
