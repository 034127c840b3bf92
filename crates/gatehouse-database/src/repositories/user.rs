//! PostgreSQL credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::user::{NewUser, User, UserRole};

use crate::store::CredentialStore;

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at, updated_at";
const USERNAME_CONSTRAINT: &str = "admin_users_username_key";

/// Raw `admin_users` row; `role` is stored as TEXT.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: UserRole = row.role.parse().map_err(|_| {
            AppError::database(format!("Unknown role '{}' stored for user {}", row.role, row.id))
        })?;
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn map_write_error(e: sqlx::Error, username: &str, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(USERNAME_CONSTRAINT) => {
            AppError::conflict(format!("Username '{username}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

/// [`CredentialStore`] over the `admin_users` table.
///
/// Deletes are soft: `deleted_at` is stamped and the row disappears from
/// every read, freeing the username for reuse.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let sql = format!(
            "INSERT INTO admin_users (username, password_hash, role) \
             VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &user.username, "Failed to create user"))?
            .try_into()
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM admin_users \
             WHERE LOWER(username) = LOWER($1) AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM admin_users WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))?
            .map(User::try_from)
            .transpose()
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let sql = format!(
            "UPDATE admin_users SET username = $2, password_hash = $3, role = $4, \
                                    updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &user.username, "Failed to update user"))?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))?
            .try_into()
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE admin_users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM admin_users WHERE deleted_at IS NULL ORDER BY id"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM admin_users WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count users", e)
                })?;
        Ok(count as u64)
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM admin_users WHERE role = $1 AND deleted_at IS NULL",
        )
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users by role", e))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        let now = Utc::now();
        UserRow {
            id: 3,
            username: "carol".to_string(),
            password_hash: "hash".to_string(),
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_conversion() {
        let user = User::try_from(row("super_admin")).unwrap();
        assert_eq!(user.role, UserRole::SuperAdmin);
        assert_eq!(user.id, 3);
    }

    #[test]
    fn test_unknown_role_is_a_database_error() {
        let err = User::try_from(row("root")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
    }
}
