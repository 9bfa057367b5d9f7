use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An operation a user may perform on a subject.
///
/// `Manage` is a wildcard: a rule granted with `Manage` covers every action on
/// the same subject scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Manage,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Manage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Action::Manage)
    }

    /// Whether a rule granted with `self` satisfies a query for `requested`.
    pub fn covers(self, requested: Action) -> bool {
        self.is_wildcard() || self == requested
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
