//! Table manager over a single SQLite file
//!
//! Every managed table gets a row in `meta_table` recording its type and
//! creation time, plus an autoincrement `id` column ahead of its own text
//! columns.

use sqlx::{Row, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use super::sql::{self, ID_COLUMN};
use super::DataError;
use crate::db::{DbEngine, MetaTable};
use crate::models::{ColumnInfo, TableData, TableMeta, TypeFilter};
use crate::utils::dates::now_timestamp;

/// A single row of `pragma_table_info`
#[derive(Debug, sqlx::FromRow)]
struct ColumnRow {
    cid: i64,
    name: String,
    #[sqlx(rename = "type")]
    decl_type: String,
    notnull: bool,
    dflt_value: Option<String>,
    pk: i64,
}

impl ColumnRow {
    fn into_column(self) -> ColumnInfo {
        ColumnInfo {
            cid: self.cid,
            name: self.name,
            decl_type: self.decl_type,
            not_null: self.notnull,
            default_value: self.dflt_value,
            pk: self.pk,
        }
    }
}

/// Creates, fills, reads and drops managed tables
#[derive(Debug, Clone)]
pub struct DataManager {
    engine: DbEngine,
    /// Allowed table types; empty allows any
    table_types: Vec<String>,
}

impl DataManager {
    /// Open the database at `path`, creating `meta_table` when missing
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        let engine = DbEngine::connect(path).await?;
        info!("Table manager using {}", path.display());
        Ok(Self::new(engine))
    }

    pub fn new(engine: DbEngine) -> Self {
        Self {
            engine,
            table_types: Vec::new(),
        }
    }

    /// Restrict `create_table` to the given types
    pub fn with_table_types(mut self, table_types: Vec<String>) -> Self {
        self.table_types = table_types;
        self
    }

    pub fn engine(&self) -> &DbEngine {
        &self.engine
    }

    fn pool(&self) -> &SqlitePool {
        self.engine.pool()
    }

    /// Names of every table in the database file, ordered by name
    pub async fn get_tables(&self) -> Result<Vec<String>, DataError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(names)
    }

    /// Names of managed tables of the given type
    pub async fn get_my_tables(&self, filter: &TypeFilter) -> Result<Vec<String>, DataError> {
        Ok(MetaTable::names(self.pool(), filter).await?)
    }

    /// Metadata of managed tables of the given type
    pub async fn get_my_tables_info(&self, filter: &TypeFilter) -> Result<Vec<TableMeta>, DataError> {
        Ok(MetaTable::all(self.pool(), filter).await?)
    }

    /// Metadata of one managed table
    pub async fn get_table_info(&self, table: &str) -> Result<Option<TableMeta>, DataError> {
        Ok(MetaTable::get(self.pool(), table).await?)
    }

    /// Whether a table with this name exists, managed or not
    pub async fn table_exists(&self, table: &str) -> Result<bool, DataError> {
        Ok(self.stored_name(table).await?.is_some())
    }

    /// Name of the table as stored in `sqlite_master`.
    ///
    /// SQLite matches table names case-insensitively, so `SCORES` resolves
    /// to `scores`.
    async fn stored_name(&self, table: &str) -> Result<Option<String>, DataError> {
        let name: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ? COLLATE NOCASE",
        )
        .bind(table)
        .fetch_optional(self.pool())
        .await?;
        Ok(name)
    }

    /// Whether `table` keeps an implicit rowid
    async fn has_rowid(&self, table: &str) -> Result<bool, DataError> {
        let ddl: Option<String> = sqlx::query_scalar::<_, Option<String>>(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ? COLLATE NOCASE",
        )
        .bind(table)
        .fetch_optional(self.pool())
        .await?
        .flatten();
        Ok(!ddl
            .map(|d| d.to_uppercase().contains("WITHOUT ROWID"))
            .unwrap_or(false))
    }

    /// Full column descriptions; empty for an unknown table
    pub async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, DataError> {
        sql::validate_ident(table)?;

        let rows: Vec<ColumnRow> = sqlx::query_as(
            r#"SELECT cid, name, type, "notnull", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid"#,
        )
        .bind(table)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(|r| r.into_column()).collect())
    }

    /// Column names in declaration order
    pub async fn get_column_names(&self, table: &str) -> Result<Vec<String>, DataError> {
        Ok(self
            .get_columns(table)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    /// Column name -> declared type
    pub async fn get_column_types(&self, table: &str) -> Result<HashMap<String, String>, DataError> {
        Ok(self
            .get_columns(table)
            .await?
            .into_iter()
            .map(|c| (c.name, c.decl_type))
            .collect())
    }

    /// Create a table of type `kind` named `name` with one text column per entry of `columns`
    pub async fn create_table<S: AsRef<str>>(
        &self,
        kind: &str,
        name: &str,
        columns: &[S],
    ) -> Result<TableMeta, DataError> {
        sql::validate_ident(name)?;
        if columns.is_empty() {
            return Err(DataError::EmptyColumns(name.to_string()));
        }

        let mut seen = HashSet::new();
        for column in columns {
            let column = column.as_ref();
            sql::validate_ident(column)?;
            if column.eq_ignore_ascii_case(ID_COLUMN) {
                return Err(DataError::ReservedColumn(column.to_string()));
            }
            // SQLite column names are case-insensitive
            if !seen.insert(column.to_lowercase()) {
                return Err(DataError::DuplicateColumn(column.to_string()));
            }
        }

        if !self.table_types.is_empty() && !self.table_types.iter().any(|t| t == kind) {
            return Err(DataError::UnknownTableType(kind.to_string()));
        }

        if self.table_exists(name).await? || MetaTable::get(self.pool(), name).await?.is_some() {
            return Err(DataError::TableExists(name.to_string()));
        }

        let meta = TableMeta::new(name, kind, now_timestamp());
        let create_sql = sql::create_table_sql(name, columns)?;
        debug!("{}", create_sql);

        let mut tx = self.pool().begin().await?;
        MetaTable::insert(&mut *tx, &meta).await?;
        sqlx::query(&create_sql).execute(&mut *tx).await?;
        tx.commit().await?;

        info!("Created table '{}' of type '{}'", name, kind);
        Ok(meta)
    }

    /// Insert `rows` into `table`, each row ordered like `columns`.
    ///
    /// Every row is committed on its own. On failure the rows before the
    /// failing one stay stored and the error names the failing row's index.
    pub async fn insert_data<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
        rows: &[Vec<Option<String>>],
    ) -> Result<usize, DataError> {
        if !self.table_exists(table).await? {
            return Err(DataError::NoSuchTable(table.to_string()));
        }

        let insert_sql = sql::insert_sql(table, columns)?;
        debug!("{}", insert_sql);

        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DataError::RowWidth {
                    index,
                    expected: columns.len(),
                    found: row.len(),
                });
            }

            let mut query = sqlx::query(&insert_sql);
            for cell in row {
                query = query.bind(cell.as_deref());
            }

            query
                .execute(self.pool())
                .await
                .map_err(|source| DataError::RowInsert {
                    index,
                    sql: insert_sql.clone(),
                    source,
                })?;
        }

        debug!("Inserted {} rows into '{}'", rows.len(), table);
        Ok(rows.len())
    }

    /// Read a whole table, leaving out its leading `id` column
    pub async fn get_table(&self, table: &str) -> Result<TableData, DataError> {
        let columns = self.get_columns(table).await?;
        if columns.is_empty() {
            return Err(DataError::NoSuchTable(table.to_string()));
        }

        let skip = match columns.first() {
            Some(first) if first.name.eq_ignore_ascii_case(ID_COLUMN) && first.is_primary_key() => 1,
            _ => 0,
        };
        let names: Vec<&str> = columns[skip..].iter().map(|c| c.name.as_str()).collect();

        let header: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.to_string(), idx))
            .collect();

        if names.is_empty() {
            let count = self.row_count(table).await?;
            return Ok(TableData {
                header,
                rows: vec![Vec::new(); count as usize],
            });
        }

        let order_by_rowid = self.has_rowid(table).await?;
        let select_sql = sql::select_text_sql(table, &names, order_by_rowid)?;
        debug!("{}", select_sql);

        let rows = sqlx::query(&select_sql).fetch_all(self.pool()).await?;
        let rows = rows
            .iter()
            .map(|row| {
                (0..names.len())
                    .map(|i| row.try_get::<Option<String>, _>(i))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableData { header, rows })
    }

    /// Number of rows stored in `table`
    pub async fn row_count(&self, table: &str) -> Result<i64, DataError> {
        if !self.table_exists(table).await? {
            return Err(DataError::NoSuchTable(table.to_string()));
        }

        let count_sql = format!("SELECT COUNT(*) FROM {};", sql::quote_ident(table)?);
        let count: i64 = sqlx::query_scalar(&count_sql).fetch_one(self.pool()).await?;
        Ok(count)
    }

    /// Delete the metadata row and drop the table
    pub async fn remove_table(&self, table: &str) -> Result<(), DataError> {
        let name = self
            .stored_name(table)
            .await?
            .ok_or_else(|| DataError::NoSuchTable(table.to_string()))?;

        let drop_sql = sql::drop_table_sql(&name)?;
        debug!("{}", drop_sql);

        let mut tx = self.pool().begin().await?;
        MetaTable::delete(&mut *tx, &name).await?;
        sqlx::query(&drop_sql).execute(&mut *tx).await?;
        tx.commit().await?;

        info!("Removed table '{}'", name);
        Ok(())
    }
}
