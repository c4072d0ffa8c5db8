//! SQL text builders
//!
//! Identifiers are always double-quoted so numeric table and column names
//! work. Values never appear in the generated text; they are bound as
//! parameters.

use super::DataError;

/// Name of the surrogate key column added to every managed table
pub const ID_COLUMN: &str = "id";

/// Reject names SQLite cannot store as an identifier
pub fn validate_ident(name: &str) -> Result<(), DataError> {
    if name.trim().is_empty() || name.contains('\0') {
        return Err(DataError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> Result<String, DataError> {
    validate_ident(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

fn quote_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>, DataError> {
    names.iter().map(|n| quote_ident(n.as_ref())).collect()
}

/// `CREATE TABLE` with an autoincrement id followed by text columns
pub fn create_table_sql<S: AsRef<str>>(table: &str, columns: &[S]) -> Result<String, DataError> {
    let columns: Vec<String> = quote_all(columns)?
        .into_iter()
        .map(|c| format!("{} TEXT", c))
        .collect();

    Ok(format!(
        "CREATE TABLE {} ({} INTEGER PRIMARY KEY AUTOINCREMENT, {});",
        quote_ident(table)?,
        ID_COLUMN,
        columns.join(", ")
    ))
}

/// `INSERT` with one placeholder per column
pub fn insert_sql<S: AsRef<str>>(table: &str, columns: &[S]) -> Result<String, DataError> {
    let table = quote_ident(table)?;
    if columns.is_empty() {
        return Ok(format!("INSERT INTO {} DEFAULT VALUES;", table));
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({});",
        table,
        quote_all(columns)?.join(", "),
        placeholders
    ))
}

/// `SELECT` of the given columns, each read back as text.
///
/// `WITHOUT ROWID` tables have no rowid to order by; pass `false` for them.
pub fn select_text_sql<S: AsRef<str>>(
    table: &str,
    columns: &[S],
    order_by_rowid: bool,
) -> Result<String, DataError> {
    let columns: Vec<String> = quote_all(columns)?
        .into_iter()
        .map(|c| format!("CAST({} AS TEXT)", c))
        .collect();

    Ok(format!(
        "SELECT {} FROM {}{};",
        columns.join(", "),
        quote_ident(table)?,
        if order_by_rowid { " ORDER BY rowid" } else { "" }
    ))
}

/// `DROP TABLE`
pub fn drop_table_sql(table: &str) -> Result<String, DataError> {
    Ok(format!("DROP TABLE {};", quote_ident(table)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("2024").unwrap(), "\"2024\"");
        assert_eq!(quote_ident("a\"b").unwrap(), "\"a\"\"b\"");
        assert_eq!(quote_ident("x'); DROP TABLE y; --").unwrap(), "\"x'); DROP TABLE y; --\"");
        assert!(matches!(quote_ident(""), Err(DataError::InvalidIdentifier(_))));
        assert!(matches!(quote_ident("  "), Err(DataError::InvalidIdentifier(_))));
        assert!(matches!(quote_ident("a\0b"), Err(DataError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql("2023", &["name", "1"]).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE \"2023\" (id INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" TEXT, \"1\" TEXT);"
        );
    }

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql("t", &["a", "b"]).unwrap(),
            "INSERT INTO \"t\" (\"a\", \"b\") VALUES (?, ?);"
        );
        let none: [&str; 0] = [];
        assert_eq!(
            insert_sql("t", &none).unwrap(),
            "INSERT INTO \"t\" DEFAULT VALUES;"
        );
    }

    #[test]
    fn test_select_text_sql() {
        assert_eq!(
            select_text_sql("t", &["a"], true).unwrap(),
            "SELECT CAST(\"a\" AS TEXT) FROM \"t\" ORDER BY rowid;"
        );
        assert_eq!(
            select_text_sql("t", &["a"], false).unwrap(),
            "SELECT CAST(\"a\" AS TEXT) FROM \"t\";"
        );
    }
}
