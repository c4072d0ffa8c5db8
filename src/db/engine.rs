//! Database engine and connection management

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::migrations::run_migrations;

/// Database engine wrapper
#[derive(Debug, Clone)]
pub struct DbEngine {
    pool: SqlitePool,
}

impl DbEngine {
    /// Open (or create) the database at `path`, create the schema and run migrations
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }

        // Create connection options with SQLite pragmas
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database {}", path.display()))?;

        debug!("Opened database {}", path.display());

        let engine = DbEngine { pool };
        engine.create_tables().await?;
        run_migrations(engine.pool()).await?;

        Ok(engine)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create the bookkeeping tables
    async fn create_tables(&self) -> Result<()> {
        let pool = self.pool();

        // Metadata for every managed table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meta_table (
                name TEXT PRIMARY KEY NOT NULL,
                type TEXT NOT NULL,
                create_time INTEGER NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // User table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                password TEXT NOT NULL,
                roles TEXT NOT NULL DEFAULT '["user"]',
                extra TEXT DEFAULT '{}'
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_user_username ON user(username);
            "#,
        )
        .execute(pool)
        .await?;

        // Migration table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS dbmigration (
                id INTEGER PRIMARY KEY,
                version INTEGER NOT NULL DEFAULT 0
            );
            INSERT OR IGNORE INTO dbmigration (id, version) VALUES (1, 0);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connect_creates_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("test.db");

        let engine = DbEngine::connect(&path).await.unwrap();
        assert!(path.exists());

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(engine.pool())
        .await
        .unwrap();

        assert!(tables.contains(&"meta_table".to_string()));
        assert!(tables.contains(&"user".to_string()));
        assert!(tables.contains(&"dbmigration".to_string()));
        engine.close().await;
    }

    #[tokio::test]
    async fn test_reconnect_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");

        DbEngine::connect(&path).await.unwrap().close().await;
        let engine = DbEngine::connect(&path).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dbmigration")
            .fetch_one(engine.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
