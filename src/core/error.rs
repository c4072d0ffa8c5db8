//! Errors raised by the table manager

use thiserror::Error;

/// Failure of a [`DataManager`](super::DataManager) operation
#[derive(Debug, Error)]
pub enum DataError {
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("table '{0}' does not exist")]
    NoSuchTable(String),

    #[error("table '{0}' needs at least one column")]
    EmptyColumns(String),

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("column name '{0}' is reserved")]
    ReservedColumn(String),

    #[error("unknown table type '{0}'")]
    UnknownTableType(String),

    #[error("row {index} has {found} values but {expected} columns were given")]
    RowWidth {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("failed to execute the SQL statement for row {index}: {source}\n{sql}")]
    RowInsert {
        index: usize,
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
