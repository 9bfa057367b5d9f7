use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Resource kind an action targets (e.g. "Post", "User").
///
/// Subjects are an open set of strings. The sentinel [`Subject::ALL`] (`"all"`)
/// stands for every subject when it appears in a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(Cow<'static, str>);

impl Subject {
    pub const ALL: Subject = Subject::from_static("all");
    pub const POST: Subject = Subject::from_static("Post");
    pub const USER: Subject = Subject::from_static("User");
    pub const SETTINGS: Subject = Subject::from_static("Settings");

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "all"
    }

    /// Whether a rule granted on `self` satisfies a query for `requested`.
    ///
    /// A query for `"all"` is only satisfied by a rule on `"all"`.
    pub fn covers(&self, requested: &str) -> bool {
        self.is_wildcard() || self.as_str() == requested
    }
}

impl core::fmt::Display for Subject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Subject {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
