//! Serializers for command output
//!
//! Converts models into JSON documents or aligned plain-text tables.

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::models::{TableData, TableMeta};

#[derive(Debug, Clone, Serialize)]
pub struct TableMetaResponse {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub create_time: i64,
    pub created: String,
    pub created_relative: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<i64>,
}

impl TableMetaResponse {
    pub fn new(meta: &TableMeta, rows: Option<i64>) -> Self {
        Self {
            name: meta.name.clone(),
            kind: meta.kind.clone(),
            create_time: meta.create_time,
            created: meta.created_at(),
            created_relative: meta.created_relative(),
            rows,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableDataResponse<'a> {
    pub columns: Vec<&'a str>,
    pub rows: &'a [Vec<Option<String>>],
}

impl<'a> From<&'a TableData> for TableDataResponse<'a> {
    fn from(data: &'a TableData) -> Self {
        Self {
            columns: data.column_names(),
            rows: &data.rows,
        }
    }
}

/// Render rows as a left-aligned text table with a header rule
pub fn render_text_table<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let pad = widths[i].saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(format_line(headers.iter().map(|h| h.as_ref()).collect()));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(format_line(row.iter().map(String::as_str).collect()));
    }

    out.join("\n")
}

/// Plain-text rendering of a stored table; NULL cells print empty
pub fn render_table_data(data: &TableData) -> String {
    let rows: Vec<Vec<String>> = data
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.clone().unwrap_or_default()).collect())
        .collect();
    render_text_table(&data.column_names(), &rows)
}

/// Parse a rows document: a JSON array of arrays.
///
/// Strings are stored as-is, `null` becomes NULL and numbers or booleans
/// are stored as their JSON text.
pub fn rows_from_json(json: &str) -> Result<Vec<Vec<Option<String>>>> {
    let rows: Vec<Vec<serde_json::Value>> =
        serde_json::from_str(json).context("Rows must be a JSON array of arrays")?;

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            row.into_iter()
                .map(|cell| match cell {
                    serde_json::Value::Null => Ok(None),
                    serde_json::Value::String(s) => Ok(Some(s)),
                    serde_json::Value::Number(n) => Ok(Some(n.to_string())),
                    serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
                    other => bail!("Row {} contains a nested value: {}", index, other),
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_render_text_table() {
        let rows = vec![
            vec!["scores".to_string(), "grades".to_string()],
            vec!["t".to_string(), "x".to_string()],
        ];
        let out = render_text_table(&["name", "type"], &rows);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "name    type");
        assert_eq!(lines[1], "------  ------");
        assert_eq!(lines[2], "scores  grades");
        assert_eq!(lines[3], "t       x");
    }

    #[test]
    fn test_rows_from_json() {
        let rows = rows_from_json(r#"[["a", null], [1, true]]"#).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Some("a".to_string()), None],
                vec![Some("1".to_string()), Some("true".to_string())],
            ]
        );

        assert!(rows_from_json(r#"[["a", ["nested"]]]"#).is_err());
        assert!(rows_from_json(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_table_data_response() {
        let data = TableData {
            header: HashMap::from([("a".to_string(), 0), ("b".to_string(), 1)]),
            rows: vec![vec![Some("1".to_string()), None]],
        };

        let json = serde_json::to_value(TableDataResponse::from(&data)).unwrap();
        assert_eq!(json["columns"], serde_json::json!(["a", "b"]));
        assert_eq!(json["rows"], serde_json::json!([["1", null]]));

        let text = render_table_data(&data);
        assert_eq!(text.lines().nth(2), Some("1"));
    }
}
