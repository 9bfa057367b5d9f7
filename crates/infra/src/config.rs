//! Configuration loading and representation.
//!
//! The in-memory directory is seeded from a JSON document:
//!
//! ```json
//! { "users": [ { "id": "admin-1", "email": "admin@example.com", "name": "Admin", "role": "admin" } ] }
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rolegate_auth::{Role, User};
use rolegate_core::UserId;

/// Environment variable naming the directory seed file.
pub const DIRECTORY_ENV: &str = "ROLEGATE_DIRECTORY";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("duplicate user id '{0}'")]
    DuplicateId(String),

    #[error("duplicate email '{0}'")]
    DuplicateEmail(String),

    #[error("invalid email '{0}'")]
    InvalidEmail(String),

    #[error("seed must contain at least one admin")]
    NoAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Seed data for the user directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl DirectoryConfig {
    /// Parse and validate a JSON seed document.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("parsing directory seed")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading directory seed {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("loading {}", path.display()))
    }

    /// Load the file named by [`DIRECTORY_ENV`], if the variable is set.
    pub fn from_env() -> anyhow::Result<Option<Self>> {
        match std::env::var(DIRECTORY_ENV) {
            Ok(path) => Self::from_path(path).map(Some),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(e).context(DIRECTORY_ENV),
        }
    }

    /// Ids and emails (case-insensitive) must be unique, and the directory
    /// must start with at least one admin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        let mut emails = HashSet::new();

        for user in &self.users {
            if !ids.insert(user.id.as_str()) {
                return Err(ConfigError::DuplicateId(user.id.to_string()));
            }
            let email = user.email.trim().to_lowercase();
            if !email.contains('@') {
                return Err(ConfigError::InvalidEmail(user.email.clone()));
            }
            if !emails.insert(email) {
                return Err(ConfigError::DuplicateEmail(user.email.clone()));
            }
        }

        if !self.users.iter().any(|u| u.role.is_admin()) {
            return Err(ConfigError::NoAdmin);
        }
        Ok(())
    }

    pub fn users(&self) -> impl Iterator<Item = User> + '_ {
        self.users.iter().map(|seed| {
            User::new(
                seed.id.clone(),
                seed.email.trim().to_lowercase(),
                seed.name.clone(),
                seed.role,
            )
        })
    }
}
