//! `rolegate-core`: identifiers and the shared error taxonomy.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::UserId;
