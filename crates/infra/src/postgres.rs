//! Postgres-backed user directory.
//!
//! Expects a `users` table managed elsewhere:
//!
//! ```sql
//! CREATE TABLE users (
//!     id    TEXT PRIMARY KEY,
//!     email TEXT NOT NULL UNIQUE,
//!     name  TEXT NOT NULL,
//!     role  TEXT NOT NULL CHECK (role IN ('user', 'editor', 'admin'))
//! );
//! ```
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | DomainError | Scenario |
//! |------------|----------------------|-------------|----------|
//! | Database (serialization failure) | `40001` | `Repository` | Concurrent demotion lost the race; the caller may retry |
//! | Database (other) | Any other | `Repository` | Constraint or query errors |
//! | PoolClosed / Io / other | N/A | `Repository` | Network errors, connection failures, etc. |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{instrument, warn};

use rolegate_auth::role_change::LAST_ADMIN_MESSAGE;
use rolegate_auth::{Role, User, UserManagementRepository, UserRepository};
use rolegate_core::{DomainError, DomainResult, UserId};

/// Postgres implementation of both user ports.
///
/// `demote_admin` runs the admin count and the update in one SERIALIZABLE
/// transaction. Two concurrent demotions that would together remove the last
/// admin cannot both commit: one of them aborts with a serialization failure.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const SERIALIZATION_FAILURE: &str = "40001";

fn is_serialization_failure(code: Option<&str>) -> bool {
    code == Some(SERIALIZATION_FAILURE)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db_err) => {
            if is_serialization_failure(db_err.code().as_deref()) {
                warn!(operation, "serialization failure");
            }
            DomainError::repository(format!(
                "database error in {}: {}",
                operation,
                db_err.message()
            ))
        }
        other => DomainError::repository(format!("{operation}: {other}")),
    }
}

fn user_from_row(row: &PgRow) -> DomainResult<User> {
    let read = |column: &str| -> DomainResult<String> {
        row.try_get::<String, _>(column)
            .map_err(|e| DomainError::repository(format!("failed to read {column}: {e}")))
    };

    user_from_columns(read("id")?, read("email")?, read("name")?, &read("role")?)
}

/// A stored role outside the closed set is corrupt data, not a client error.
fn user_from_columns(id: String, email: String, name: String, role: &str) -> DomainResult<User> {
    let role = role
        .parse::<Role>()
        .map_err(|e| DomainError::repository(format!("corrupt role for user {id}: {e}")))?;
    Ok(User::new(id, email, name, role))
}

fn not_found(id: &UserId) -> DomainError {
    DomainError::not_found(format!("User with ID {id} not found"))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, name, role FROM users WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, name, role FROM users WHERE lower(email) = lower($1)")
            .bind(email.trim())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl UserManagementRepository for PostgresUserRepository {
    #[instrument(skip(self), fields(user_id = %id, role = %role), err)]
    async fn update_user_role(&self, id: &UserId, role: Role) -> DomainResult<User> {
        let row = sqlx::query(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING id, email, name, role",
        )
        .bind(id.as_str())
        .bind(role.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user_role", e))?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(not_found(id)),
        }
    }

    #[instrument(skip(self), err)]
    async fn count_admins(&self) -> DomainResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_admins", e))?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self), fields(user_id = %id, role = %role), err)]
    async fn demote_admin(&self, id: &UserId, role: Role) -> DomainResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        let current = sqlx::query("SELECT id, email, name, role FROM users WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("demote_admin.load", e))?;
        let Some(current) = current else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(not_found(id));
        };
        let current = user_from_row(&current)?;

        if current.is_admin() && !role.is_admin() {
            let admins: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("demote_admin.count", e))?;
            if admins <= 1 {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(DomainError::forbidden(LAST_ADMIN_MESSAGE));
            }
        }

        let row = sqlx::query(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING id, email, name, role",
        )
        .bind(id.as_str())
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("demote_admin.update", e))?;
        let updated = user_from_row(&row)?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(updated)
    }
}
