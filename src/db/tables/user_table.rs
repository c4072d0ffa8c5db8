//! User table operations

use anyhow::Result;
use sqlx::{FromRow, SqlitePool};

use crate::models::{User, UserRole};

/// Database row for user table
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    roles: String,
    extra: Option<String>,
}

impl UserRow {
    fn into_user(self) -> User {
        let roles: Vec<UserRole> =
            serde_json::from_str(&self.roles).unwrap_or_else(|_| vec![UserRole::User]);
        let extra: serde_json::Value = self
            .extra
            .as_deref()
            .and_then(|e| serde_json::from_str(e).ok())
            .unwrap_or(serde_json::Value::Null);

        User {
            id: self.id,
            username: self.username,
            password: self.password,
            roles,
            extra,
        }
    }
}

/// User table operations
pub struct UserTable;

impl UserTable {
    /// Get user by username
    pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password, roles, extra FROM user WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Insert a user
    pub async fn insert(pool: &SqlitePool, user: &User) -> Result<i64> {
        let roles = serde_json::to_string(&user.roles)?;
        let extra = match &user.extra {
            serde_json::Value::Null => "{}".to_string(),
            other => serde_json::to_string(other)?,
        };

        let result =
            sqlx::query("INSERT INTO user (username, password, roles, extra) VALUES (?, ?, ?, ?)")
                .bind(&user.username)
                .bind(&user.password)
                .bind(&roles)
                .bind(&extra)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    /// Update only the password for a user
    pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE user SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Get user count
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user")
            .fetch_one(pool)
            .await?;

        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbEngine;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let dir = TempDir::new().unwrap();
        let engine = DbEngine::connect(&dir.path().join("test.db")).await.unwrap();
        let pool = engine.pool();

        let id = UserTable::insert(pool, &User::with_role("root".into(), "h1".into(), UserRole::Admin))
            .await
            .unwrap();
        assert!(id > 0);

        let user = UserTable::get_by_username(pool, "root").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_admin());
        assert_eq!(user.password, "h1");

        UserTable::update_password(pool, id, "h2").await.unwrap();
        let user = UserTable::get_by_username(pool, "root").await.unwrap().unwrap();
        assert_eq!(user.password, "h2");

        assert_eq!(UserTable::count(pool).await.unwrap(), 1);
        assert!(UserTable::get_by_username(pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let dir = TempDir::new().unwrap();
        let engine = DbEngine::connect(&dir.path().join("test.db")).await.unwrap();

        let user = User::with_role("ann".into(), "h".into(), UserRole::User);
        UserTable::insert(engine.pool(), &user).await.unwrap();
        assert!(UserTable::insert(engine.pool(), &user).await.is_err());
        assert_eq!(UserTable::count(engine.pool()).await.unwrap(), 1);
    }
}
