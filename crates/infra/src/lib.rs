//! Infrastructure layer: repository adapters and configuration.

pub mod config;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;


pub use config::{ConfigError, DirectoryConfig, SeedUser};
pub use memory::InMemoryUserRepository;
#[cfg(feature = "postgres")]
pub use postgres::PostgresUserRepository;
