//! Column model

use serde::{Deserialize, Serialize};

/// One row of `PRAGMA table_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Zero-based column position
    pub cid: i64,
    pub name: String,
    /// Declared type, empty when none was given
    pub decl_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    /// Position within the primary key, 0 when not part of it
    pub pk: i64,
}

impl ColumnInfo {
    pub fn is_primary_key(&self) -> bool {
        self.pk > 0
    }
}
