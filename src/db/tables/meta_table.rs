//! Metadata table operations

use sqlx::{Executor, FromRow, Sqlite, SqlitePool};

use crate::models::{TableMeta, TypeFilter};

/// Database row for meta_table
#[derive(Debug, FromRow)]
struct MetaRow {
    name: String,
    #[sqlx(rename = "type")]
    kind: String,
    create_time: i64,
}

impl MetaRow {
    fn into_meta(self) -> TableMeta {
        TableMeta {
            name: self.name,
            kind: self.kind,
            create_time: self.create_time,
        }
    }
}

/// meta_table operations
pub struct MetaTable;

impl MetaTable {
    /// Names of managed tables matching `filter`
    pub async fn names(pool: &SqlitePool, filter: &TypeFilter) -> Result<Vec<String>, sqlx::Error> {
        match filter {
            TypeFilter::All => {
                sqlx::query_scalar("SELECT name FROM meta_table ORDER BY name")
                    .fetch_all(pool)
                    .await
            }
            TypeFilter::Only(kind) => {
                sqlx::query_scalar("SELECT name FROM meta_table WHERE type = ? ORDER BY name")
                    .bind(kind)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Metadata rows matching `filter`
    pub async fn all(pool: &SqlitePool, filter: &TypeFilter) -> Result<Vec<TableMeta>, sqlx::Error> {
        let rows: Vec<MetaRow> = match filter {
            TypeFilter::All => {
                sqlx::query_as("SELECT name, type, create_time FROM meta_table ORDER BY name")
                    .fetch_all(pool)
                    .await?
            }
            TypeFilter::Only(kind) => {
                sqlx::query_as(
                    "SELECT name, type, create_time FROM meta_table WHERE type = ? ORDER BY name",
                )
                .bind(kind)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.into_meta()).collect())
    }

    /// Get metadata by table name, ignoring case like SQLite does
    pub async fn get(pool: &SqlitePool, name: &str) -> Result<Option<TableMeta>, sqlx::Error> {
        let row: Option<MetaRow> = sqlx::query_as(
            "SELECT name, type, create_time FROM meta_table WHERE name = ? COLLATE NOCASE",
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|r| r.into_meta()))
    }

    /// Insert a metadata row
    pub async fn insert<'e, E>(executor: E, meta: &TableMeta) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("INSERT INTO meta_table (name, type, create_time) VALUES (?, ?, ?)")
            .bind(&meta.name)
            .bind(&meta.kind)
            .bind(meta.create_time)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Delete a metadata row (case-insensitive), returns whether one existed
    pub async fn delete<'e, E>(executor: E, name: &str) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM meta_table WHERE name = ? COLLATE NOCASE")
            .bind(name)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count managed tables
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM meta_table")
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbEngine;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_and_filter() {
        let dir = TempDir::new().unwrap();
        let engine = DbEngine::connect(&dir.path().join("test.db")).await.unwrap();
        let pool = engine.pool();

        MetaTable::insert(pool, &TableMeta::new("b", "grades", 10)).await.unwrap();
        MetaTable::insert(pool, &TableMeta::new("a", "payroll", 20)).await.unwrap();

        let all = MetaTable::names(pool, &TypeFilter::All).await.unwrap();
        assert_eq!(all, vec!["a".to_string(), "b".to_string()]);

        let grades = MetaTable::all(pool, &TypeFilter::Only("grades".into()))
            .await
            .unwrap();
        assert_eq!(grades, vec![TableMeta::new("b", "grades", 10)]);

        assert_eq!(MetaTable::count(pool).await.unwrap(), 2);
        assert_eq!(
            MetaTable::get(pool, "B").await.unwrap(),
            Some(TableMeta::new("b", "grades", 10))
        );
        assert!(MetaTable::delete(pool, "A").await.unwrap());
        assert!(!MetaTable::delete(pool, "a").await.unwrap());
        assert!(MetaTable::get(pool, "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let dir = TempDir::new().unwrap();
        let engine = DbEngine::connect(&dir.path().join("test.db")).await.unwrap();

        let meta = TableMeta::new("dup", "grades", 1);
        MetaTable::insert(engine.pool(), &meta).await.unwrap();
        assert!(MetaTable::insert(engine.pool(), &meta).await.is_err());
    }
}
