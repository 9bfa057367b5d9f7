//! Resolved, queryable permission sets.

use serde::Serialize;

use crate::{Action, Subject};

/// A declarative grant: `action` is allowed on `subject`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
    pub action: Action,
    pub subject: Subject,
}

impl Rule {
    pub const fn new(action: Action, subject: Subject) -> Self {
        Self { action, subject }
    }

    /// Whether this rule grants `action` on `subject`, honouring both wildcards.
    pub fn matches(&self, action: Action, subject: &str) -> bool {
        self.action.covers(action) && self.subject.covers(subject)
    }
}

impl core::fmt::Display for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} on {}", self.action, self.subject)
    }
}

/// A user's resolved permission set.
///
/// Immutable once built and derived entirely from the rules handed to the
/// builder. An `Ability` outlives nothing: it is rebuilt for every check, so a
/// role change is visible on the very next query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ability {
    rules: Vec<Rule>,
}

impl Ability {
    pub fn builder() -> AbilityBuilder {
        AbilityBuilder::default()
    }

    pub fn can(&self, action: Action, subject: &str) -> bool {
        self.relevant_rule(action, subject).is_some()
    }

    pub fn cannot(&self, action: Action, subject: &str) -> bool {
        !self.can(action, subject)
    }

    /// First rule granting `action` on `subject`, if any.
    pub fn relevant_rule(&self, action: Action, subject: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(action, subject))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Accumulates rules, then freezes them into an [`Ability`].
#[derive(Debug, Clone, Default)]
pub struct AbilityBuilder {
    rules: Vec<Rule>,
}

impl AbilityBuilder {
    pub fn can(&mut self, action: Action, subject: impl Into<Subject>) -> &mut Self {
        self.grant(Rule::new(action, subject.into()))
    }

    pub fn grant(&mut self, rule: Rule) -> &mut Self {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self
    }

    pub fn build(&self) -> Ability {
        Ability {
            rules: self.rules.clone(),
        }
    }
}
