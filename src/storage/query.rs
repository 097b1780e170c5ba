//! Schema discovery and paged reads against an open connection.
//!
//! Table and column names cannot be bound as parameters, so every identifier
//! that reaches SQL text goes through [`quote_ident`]. Callers are still
//! expected to check names against the discovered table list first.

use crate::error::Result;
use crate::value::{Row, Value};
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use tracing::debug;

/// One page of rows together with the column names of the result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Substring filter applied to every column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    columns: Vec<String>,
    text: String,
}

impl SearchFilter {
    pub fn new(columns: Vec<String>, text: impl Into<String>) -> Self {
        Self {
            columns,
            text: text.into(),
        }
    }

    /// The text being searched for, as typed by the user.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `WHERE` body matching rows where any column, cast to text, contains
    /// the search text. All columns share the single `?1` pattern.
    fn where_clause(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("CAST({} AS TEXT) LIKE ?1 ESCAPE '\\'", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    /// LIKE pattern with wildcards in the search text escaped.
    fn pattern(&self) -> String {
        let mut escaped = String::with_capacity(self.text.len() + 2);
        escaped.push('%');
        for ch in self.text.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(ch);
        }
        escaped.push('%');
        escaped
    }
}

/// Quote an identifier for interpolation into SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Names of all user tables, alphabetically.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
         ORDER BY name",
    )?;

    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut tables = Vec::new();
    for row in rows {
        tables.push(row?);
    }

    Ok(tables)
}

/// Column names of `table` in declaration order.
pub fn list_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;

    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }

    Ok(columns)
}

/// Number of rows in `table`, optionally restricted to `filter` matches.
pub fn count_rows(conn: &Connection, table: &str, filter: Option<&SearchFilter>) -> Result<usize> {
    let (sql, bound) = build_select("COUNT(*)", table, filter);
    let count: i64 = conn.query_row(&sql, params_from_iter(bound.iter()), |row| row.get(0))?;
    Ok(count as usize)
}

/// Read at most `limit` rows of `table` starting at row `offset`.
///
/// No `ORDER BY` is applied: rows come back in the engine's natural order.
pub fn select_page(
    conn: &Connection,
    table: &str,
    filter: Option<&SearchFilter>,
    limit: usize,
    offset: usize,
) -> Result<Page> {
    let (select, bound) = build_select("*", table, filter);
    let sql = format!("{} LIMIT {} OFFSET {}", select, limit, offset);
    debug!("[query] {}", sql);

    let mut stmt = conn.prepare(&sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = columns.len();

    let rows = stmt.query_map(params_from_iter(bound.iter()), |row| {
        (0..column_count)
            .map(|i| row.get_ref(i).map(Value::from))
            .collect::<rusqlite::Result<Row>>()
    })?;

    let mut page = Page {
        columns,
        rows: Vec::new(),
    };
    for row in rows {
        page.rows.push(row?);
    }

    Ok(page)
}

fn build_select(
    projection: &str,
    table: &str,
    filter: Option<&SearchFilter>,
) -> (String, Vec<String>) {
    let mut sql = format!("SELECT {} FROM {}", projection, quote_ident(table));
    let mut bound = Vec::new();
    if let Some(filter) = filter.filter(|f| !f.columns.is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.where_clause());
        bound.push(filter.pattern());
    }
    (sql, bound)
}
