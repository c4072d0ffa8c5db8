//! Database migrations

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Current migration version
const CURRENT_VERSION: i32 = 2;

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_migration_version(pool).await?;

    if current_version >= CURRENT_VERSION {
        info!("Database is up to date (version {})", current_version);
        return Ok(());
    }

    info!(
        "Running migrations from version {} to {}",
        current_version, CURRENT_VERSION
    );

    // Run migrations in order
    for version in (current_version + 1)..=CURRENT_VERSION {
        run_migration(pool, version).await?;

        sqlx::query("UPDATE dbmigration SET version = ? WHERE id = 1")
            .bind(version)
            .execute(pool)
            .await?;

        info!("Applied migration {}", version);
    }

    Ok(())
}

async fn run_migration(pool: &SqlitePool, version: i32) -> Result<()> {
    match version {
        1 => {
            // Baseline - tables are created by the engine
        }
        2 => {
            sqlx::query("CREATE INDEX IF NOT EXISTS idx_meta_table_type ON meta_table(type)")
                .execute(pool)
                .await?;
        }
        _ => {
            tracing::warn!("Unknown migration version: {}", version);
        }
    }

    Ok(())
}

/// Get the current migration version
pub async fn get_migration_version(pool: &SqlitePool) -> Result<i32> {
    let row: (i32,) = sqlx::query_as("SELECT version FROM dbmigration WHERE id = 1")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbEngine;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_migrations_reach_current_version() {
        let dir = TempDir::new().unwrap();
        let engine = DbEngine::connect(&dir.path().join("test.db")).await.unwrap();

        assert_eq!(
            get_migration_version(engine.pool()).await.unwrap(),
            CURRENT_VERSION
        );

        let index: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_meta_table_type'",
        )
        .fetch_one(engine.pool())
        .await
        .unwrap();
        assert_eq!(index, 1);

        // running again is a no-op
        run_migrations(engine.pool()).await.unwrap();
    }
}
