//! Managed table models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::dates;

/// Type label that selects every managed table regardless of its type
const ALL_TABLES_LABEL: &str = "全部表格";

/// Selects managed tables by their type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Every managed table
    #[default]
    All,
    /// Only tables of the given type
    Only(String),
}

impl TypeFilter {
    /// Parse a user-supplied type label.
    ///
    /// Both the `全部表格` label and the keyword `all` select every table.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label == ALL_TABLES_LABEL || label.eq_ignore_ascii_case("all") {
            TypeFilter::All
        } else {
            TypeFilter::Only(label.to_string())
        }
    }
}

impl From<Option<&str>> for TypeFilter {
    fn from(label: Option<&str>) -> Self {
        label.map(TypeFilter::parse).unwrap_or_default()
    }
}

/// A row of `meta_table`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    /// Table name
    pub name: String,
    /// Table type (e.g. the spreadsheet template it was imported from)
    #[serde(rename = "type")]
    pub kind: String,
    /// Creation time, Unix seconds
    pub create_time: i64,
}

impl TableMeta {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, create_time: i64) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            create_time,
        }
    }

    /// Creation time as "YYYY-MM-DD HH:MM:SS"
    pub fn created_at(&self) -> String {
        dates::format_datetime(self.create_time)
    }

    /// Creation time relative to now, e.g. "2 hours ago"
    pub fn created_relative(&self) -> String {
        dates::timestamp_to_relative(self.create_time)
    }
}

/// Contents of a stored table without its `id` column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableData {
    /// Column name -> position within each row
    pub header: HashMap<String, usize>,
    /// Row values in storage order
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableData {
    /// Column names ordered by their position in a row
    pub fn column_names(&self) -> Vec<&str> {
        let mut columns: Vec<(&str, usize)> = self
            .header
            .iter()
            .map(|(name, idx)| (name.as_str(), *idx))
            .collect();
        columns.sort_by_key(|(_, idx)| *idx);
        columns.into_iter().map(|(name, _)| name).collect()
    }

    /// Value of `column` in row `row`, `None` for NULL or missing cells
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = *self.header.get(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_filter_parse() {
        assert_eq!(TypeFilter::parse("全部表格"), TypeFilter::All);
        assert_eq!(TypeFilter::parse("ALL"), TypeFilter::All);
        assert_eq!(
            TypeFilter::parse(" grades "),
            TypeFilter::Only("grades".to_string())
        );
        assert_eq!(TypeFilter::from(None), TypeFilter::All);
    }

    #[test]
    fn test_table_data_lookup() {
        let data = TableData {
            header: HashMap::from([("b".to_string(), 1), ("a".to_string(), 0)]),
            rows: vec![vec![Some("1".to_string()), None]],
        };

        assert_eq!(data.column_names(), vec!["a", "b"]);
        assert_eq!(data.get(0, "a"), Some("1"));
        assert_eq!(data.get(0, "b"), None);
        assert_eq!(data.get(1, "a"), None);
        assert_eq!(data.get(0, "missing"), None);
    }

    #[test]
    fn test_meta_serializes_type_field() {
        let meta = TableMeta::new("scores", "grades", 0);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "grades");
        assert_eq!(json["create_time"], 0);
    }
}
